/// Router Module Index
///
/// Splits the routing table by access level. Each module returns an unlayered
/// `Router<AppState>`; `create_router` decides which gate wraps which module.

/// Routes open to anyone: the docs redirect and the health probe.
pub mod public;

/// The `/api` tree. Every route here sits behind the `x-api-key` gate.
pub mod api;
