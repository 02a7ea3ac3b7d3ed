//! HTTP handlers, one module per resource.
//!
//! Every handler is a pass-through: decode the path and body, call the matching repository
//! operation, and hand back its result. `ApiError` turns a repository failure into the
//! corresponding status.

pub mod ingredient_categories;
pub mod ingredients;
pub mod permissions;
pub mod units;
pub mod user_roles;
pub mod users;

pub const USER_ROLES_TAG: &str = "user_roles";
pub const PERMISSIONS_TAG: &str = "permissions";
pub const USERS_TAG: &str = "users";
pub const UNITS_TAG: &str = "units";
pub const INGREDIENT_CATEGORIES_TAG: &str = "ingredient_categories";
pub const INGREDIENTS_TAG: &str = "ingredients";
