use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Strips leading and trailing whitespace before validation sees the value.
/// The field stays required: a missing key is still a deserialization error.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_owned())
}

// --- Access Control ---

/// UserRole
///
/// A row of `user_roles`. Owns the users assigned to it and its permission grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserRole {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// Body of `POST /api/user_roles` and `PUT /api/user_roles/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UserRoleInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "Admin")]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 100))]
    #[schema(example = "The admin user role.")]
    pub description: String,
}

/// Permission
///
/// A row of `permissions`. Granted to roles through `role_permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Permission {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct PermissionInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "Create Recipe")]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 100))]
    #[schema(example = "The create recipe permission.")]
    pub description: String,
}

// --- Users ---

/// User
///
/// The public view of a `users` row. The stored password hash is never selected into this
/// struct, so it cannot leak through a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub account_type: String,
    pub profile_picture: String,
    // FK to user_roles.id.
    pub role_id: i32,
    pub is_active: bool,
}

/// Body of `POST /api/users` and `PUT /api/users/{id}`. Every field is required and every
/// field is written on update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UserInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "johndoe")]
    pub username: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100), email)]
    #[schema(example = "johndoe@gmail.com")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "password")]
    pub password: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 30))]
    #[schema(example = "admin")]
    pub account_type: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 255))]
    #[schema(example = "profile.jpg")]
    pub profile_picture: String,
    #[schema(example = 1)]
    pub role_id: i32,
    #[schema(example = true)]
    pub is_active: bool,
}

/// NewUser
///
/// What the repository persists for a user: the validated input with the plain password
/// already replaced by its Argon2 hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub account_type: String,
    pub profile_picture: String,
    pub role_id: i32,
    pub is_active: bool,
}

impl NewUser {
    pub fn from_input(input: UserInput, password_hash: String) -> Self {
        Self {
            username: input.username,
            email: input.email,
            password_hash,
            account_type: input.account_type,
            profile_picture: input.profile_picture,
            role_id: input.role_id,
            is_active: input.is_active,
        }
    }
}

// --- Ingredients ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Unit {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct UnitInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "gram")]
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct IngredientCategory {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct IngredientCategoryInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "Vegetables")]
    pub name: String,
    pub is_active: bool,
}

/// Ingredient
///
/// A row of `ingredients`. Category and unit are optional references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub calories: i32,
    pub expiration_date: NaiveDate,
    pub is_active: bool,
    pub category_id: Option<i32>,
    pub unit_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct IngredientInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30))]
    #[schema(example = "Carrot")]
    pub name: String,
    #[validate(range(min = 0))]
    #[schema(example = 41)]
    pub calories: i32,
    #[schema(example = "2025-12-31")]
    pub expiration_date: NaiveDate,
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub unit_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_before_validating() {
        let input: UserRoleInput =
            serde_json::from_str(r#"{"name": "   Admin   ", "description": "  Boss.  "}"#).unwrap();

        assert_eq!(input.name, "Admin");
        assert_eq!(input.description, "Boss.");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn whitespace_does_not_count_towards_length() {
        let padded = format!("  {}  ", "x".repeat(30));
        let body = serde_json::json!({ "name": padded, "description": "" });
        let input: PermissionInput = serde_json::from_value(body).unwrap();

        assert!(input.validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let input: UserRoleInput =
            serde_json::from_str(r#"{"name": "   ", "description": "x"}"#).unwrap();

        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn missing_field_fails_deserialization() {
        let result = serde_json::from_str::<UserRoleInput>(r#"{"name": "Admin"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn ingredient_references_default_to_none() {
        let input: IngredientInput = serde_json::from_str(
            r#"{"name": "Salt", "calories": 0, "expiration_date": "2030-01-01", "is_active": true}"#,
        )
        .unwrap();

        assert_eq!(input.category_id, None);
        assert_eq!(input.unit_id, None);
    }
}
