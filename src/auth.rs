use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use utoipa::{
    Modify,
    openapi::security::{ApiKey as ApiKeyScheme, ApiKeyValue, SecurityScheme},
};

use crate::{config::AppConfig, error::ApiError};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Name of the security scheme in the generated OpenAPI document.
pub const API_KEY_SCHEME: &str = "api_key";

/// ApiKey Extractor Result
///
/// Proof that the request presented the process-wide secret. It carries no identity: there is
/// a single key for the whole API, with no scoping and no rotation.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

/// ApiKey Extractor Implementation
///
/// Compares the `x-api-key` header with `AppConfig::api_key`. An absent header, a header that
/// is not visible ASCII, and a wrong value are all rejected the same way, with
/// `ApiError::Unauthorized` (403 and the fixed error body).
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(key) if keys_match(key, &config.api_key) => Ok(ApiKey),
            Some(_) => {
                tracing::warn!(uri = %parts.uri, "rejected request with wrong api key");
                Err(ApiError::Unauthorized)
            }
            None => {
                tracing::warn!(uri = %parts.uri, "rejected request without api key");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Compares two keys without short-circuiting on the first differing byte.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Registers the `x-api-key` header scheme so Swagger UI can send the key.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                API_KEY_SCHEME,
                SecurityScheme::ApiKey(ApiKeyScheme::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::keys_match;

    #[test]
    fn keys_match_only_on_identical_bytes() {
        assert!(keys_match("secret-key", "secret-key"));
        assert!(!keys_match("secret-kez", "secret-key"));
        assert!(!keys_match("secret", "secret-key"));
        assert!(!keys_match("", "secret-key"));
    }
}
