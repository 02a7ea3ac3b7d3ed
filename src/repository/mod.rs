use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Ingredient, IngredientCategory, IngredientCategoryInput, IngredientInput, NewUser, Permission,
    PermissionInput, Unit, UnitInput, User, UserRole, UserRoleInput,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Entity
///
/// Names the table an error refers to, so a repository failure can be reported as
/// "User not found" rather than a bare status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    UserRole,
    Permission,
    RolePermission,
    User,
    Unit,
    IngredientCategory,
    Ingredient,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::UserRole => "User role",
            Entity::Permission => "Permission",
            Entity::RolePermission => "Role permission",
            Entity::User => "User",
            Entity::Unit => "Unit",
            Entity::IngredientCategory => "Ingredient category",
            Entity::Ingredient => "Ingredient",
        })
    }
}

/// RepoError
///
/// The three outcomes a caller can act on. Uniqueness and foreign-key violations are both
/// `Conflict`: either way the submitted record does not fit the stored data.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(Entity),
    #[error("{0} already exists")]
    Conflict(Entity),
    #[error("Internal server error")]
    Internal(#[source] sqlx::Error),
}

impl RepoError {
    /// Classifies a driver error raised while touching `entity`'s table.
    pub fn from_sqlx(entity: Entity, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(entity),
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                tracing::debug!(%entity, constraint = ?db_err.constraint(), "constraint violation");
                RepoError::Conflict(entity)
            }
            _ => RepoError::Internal(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// The storage context handed to every handler. Each entity gets the same four operations:
/// list, get by id, create, and full-replace update. Nothing is ever deleted.
///
/// `Send + Sync + async_trait` keep `Arc<dyn Repository>` usable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User roles ---
    async fn list_user_roles(&self) -> RepoResult<Vec<UserRole>>;
    async fn get_user_role(&self, id: i32) -> RepoResult<UserRole>;
    async fn create_user_role(&self, input: UserRoleInput) -> RepoResult<UserRole>;
    async fn update_user_role(&self, id: i32, input: UserRoleInput) -> RepoResult<UserRole>;

    // --- Permissions ---
    async fn list_permissions(&self) -> RepoResult<Vec<Permission>>;
    async fn get_permission(&self, id: i32) -> RepoResult<Permission>;
    async fn create_permission(&self, input: PermissionInput) -> RepoResult<Permission>;
    async fn update_permission(&self, id: i32, input: PermissionInput) -> RepoResult<Permission>;

    // --- Role permission grants ---
    // NotFound(UserRole) when the role is missing.
    async fn list_role_permissions(&self, role_id: i32) -> RepoResult<Vec<Permission>>;
    // Idempotent: granting an existing pair succeeds without a second row.
    async fn grant_permission(&self, role_id: i32, permission_id: i32) -> RepoResult<()>;

    // --- Users ---
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn get_user(&self, id: i32) -> RepoResult<User>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn update_user(&self, id: i32, user: NewUser) -> RepoResult<User>;

    // --- Units ---
    async fn list_units(&self) -> RepoResult<Vec<Unit>>;
    async fn get_unit(&self, id: i32) -> RepoResult<Unit>;
    async fn create_unit(&self, input: UnitInput) -> RepoResult<Unit>;
    async fn update_unit(&self, id: i32, input: UnitInput) -> RepoResult<Unit>;

    // --- Ingredient categories ---
    async fn list_ingredient_categories(&self) -> RepoResult<Vec<IngredientCategory>>;
    async fn get_ingredient_category(&self, id: i32) -> RepoResult<IngredientCategory>;
    async fn create_ingredient_category(
        &self,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory>;
    async fn update_ingredient_category(
        &self,
        id: i32,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory>;

    // --- Ingredients ---
    async fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>>;
    async fn get_ingredient(&self, id: i32) -> RepoResult<Ingredient>;
    async fn create_ingredient(&self, input: IngredientInput) -> RepoResult<Ingredient>;
    async fn update_ingredient(&self, id: i32, input: IngredientInput) -> RepoResult<Ingredient>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
