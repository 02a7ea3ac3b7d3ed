use async_trait::async_trait;
use sqlx::PgPool;

use super::{Entity, RepoError, RepoResult, Repository};
use crate::models::{
    Ingredient, IngredientCategory, IngredientCategoryInput, IngredientInput, NewUser, Permission,
    PermissionInput, Unit, UnitInput, User, UserRole, UserRoleInput,
};

// No password column: `User` is the public projection.
const USER_COLUMNS: &str =
    "id, username, email, account_type, profile_picture, role_id, is_active";
const INGREDIENT_COLUMNS: &str =
    "id, name, calories, expiration_date, is_active, category_id, unit_id";

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL. Every operation is a single statement; updates use
/// `UPDATE .. RETURNING` so "not found" and "overwritten" are decided in one round trip.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, entity: Entity, sql: &str, id: i32) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(entity, e))
    }
}

/// A row removed between the existence checks and the insert surfaces as a foreign-key
/// violation; report it as the missing side, like the checks themselves would.
fn grant_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return RepoError::NotFound(missing_grant_side(db_err.constraint()));
        }
    }
    RepoError::from_sqlx(Entity::RolePermission, err)
}

fn missing_grant_side(constraint: Option<&str>) -> Entity {
    match constraint {
        Some("role_permissions_role_id_fkey") => Entity::UserRole,
        _ => Entity::Permission,
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USER ROLES ---

    async fn list_user_roles(&self) -> RepoResult<Vec<UserRole>> {
        sqlx::query_as::<_, UserRole>("SELECT id, name, description FROM user_roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::UserRole, e))
    }

    async fn get_user_role(&self, id: i32) -> RepoResult<UserRole> {
        sqlx::query_as::<_, UserRole>("SELECT id, name, description FROM user_roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::UserRole, e))?
            .ok_or(RepoError::NotFound(Entity::UserRole))
    }

    async fn create_user_role(&self, input: UserRoleInput) -> RepoResult<UserRole> {
        sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(input.name)
        .bind(input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::UserRole, e))
    }

    async fn update_user_role(&self, id: i32, input: UserRoleInput) -> RepoResult<UserRole> {
        sqlx::query_as::<_, UserRole>(
            "UPDATE user_roles SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::UserRole, e))?
        .ok_or(RepoError::NotFound(Entity::UserRole))
    }

    // --- PERMISSIONS ---

    async fn list_permissions(&self) -> RepoResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT id, name, description FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::Permission, e))
    }

    async fn get_permission(&self, id: i32) -> RepoResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, name, description FROM permissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Permission, e))?
        .ok_or(RepoError::NotFound(Entity::Permission))
    }

    async fn create_permission(&self, input: PermissionInput) -> RepoResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(input.name)
        .bind(input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Permission, e))
    }

    async fn update_permission(&self, id: i32, input: PermissionInput) -> RepoResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Permission, e))?
        .ok_or(RepoError::NotFound(Entity::Permission))
    }

    // --- ROLE PERMISSIONS ---

    async fn list_role_permissions(&self, role_id: i32) -> RepoResult<Vec<Permission>> {
        if !self
            .exists(
                Entity::UserRole,
                "SELECT EXISTS (SELECT 1 FROM user_roles WHERE id = $1)",
                role_id,
            )
            .await?
        {
            return Err(RepoError::NotFound(Entity::UserRole));
        }

        sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.id, p.name, p.description
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::RolePermission, e))
    }

    async fn grant_permission(&self, role_id: i32, permission_id: i32) -> RepoResult<()> {
        if !self
            .exists(
                Entity::UserRole,
                "SELECT EXISTS (SELECT 1 FROM user_roles WHERE id = $1)",
                role_id,
            )
            .await?
        {
            return Err(RepoError::NotFound(Entity::UserRole));
        }
        if !self
            .exists(
                Entity::Permission,
                "SELECT EXISTS (SELECT 1 FROM permissions WHERE id = $1)",
                permission_id,
            )
            .await?
        {
            return Err(RepoError::NotFound(Entity::Permission));
        }

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await
        .map_err(grant_error)?;

        Ok(())
    }

    // --- USERS ---

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::User, e))
    }

    async fn get_user(&self, id: i32) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::User, e))?
            .ok_or(RepoError::NotFound(Entity::User))
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
             (username, email, password, account_type, profile_picture, role_id, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.account_type)
        .bind(user.profile_picture)
        .bind(user.role_id)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::User, e))
    }

    async fn update_user(&self, id: i32, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                password = $4,
                account_type = $5,
                profile_picture = $6,
                role_id = $7,
                is_active = $8
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.account_type)
        .bind(user.profile_picture)
        .bind(user.role_id)
        .bind(user.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::User, e))?
        .ok_or(RepoError::NotFound(Entity::User))
    }

    // --- UNITS ---

    async fn list_units(&self) -> RepoResult<Vec<Unit>> {
        sqlx::query_as::<_, Unit>("SELECT id, name, is_active FROM units ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::Unit, e))
    }

    async fn get_unit(&self, id: i32) -> RepoResult<Unit> {
        sqlx::query_as::<_, Unit>("SELECT id, name, is_active FROM units WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::from_sqlx(Entity::Unit, e))?
            .ok_or(RepoError::NotFound(Entity::Unit))
    }

    async fn create_unit(&self, input: UnitInput) -> RepoResult<Unit> {
        sqlx::query_as::<_, Unit>(
            "INSERT INTO units (name, is_active) VALUES ($1, $2) RETURNING id, name, is_active",
        )
        .bind(input.name)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Unit, e))
    }

    async fn update_unit(&self, id: i32, input: UnitInput) -> RepoResult<Unit> {
        sqlx::query_as::<_, Unit>(
            "UPDATE units SET name = $2, is_active = $3 WHERE id = $1 \
             RETURNING id, name, is_active",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Unit, e))?
        .ok_or(RepoError::NotFound(Entity::Unit))
    }

    // --- INGREDIENT CATEGORIES ---

    async fn list_ingredient_categories(&self) -> RepoResult<Vec<IngredientCategory>> {
        sqlx::query_as::<_, IngredientCategory>(
            "SELECT id, name, is_active FROM ingredient_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::IngredientCategory, e))
    }

    async fn get_ingredient_category(&self, id: i32) -> RepoResult<IngredientCategory> {
        sqlx::query_as::<_, IngredientCategory>(
            "SELECT id, name, is_active FROM ingredient_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::IngredientCategory, e))?
        .ok_or(RepoError::NotFound(Entity::IngredientCategory))
    }

    async fn create_ingredient_category(
        &self,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory> {
        sqlx::query_as::<_, IngredientCategory>(
            "INSERT INTO ingredient_categories (name, is_active) VALUES ($1, $2) \
             RETURNING id, name, is_active",
        )
        .bind(input.name)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::IngredientCategory, e))
    }

    async fn update_ingredient_category(
        &self,
        id: i32,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory> {
        sqlx::query_as::<_, IngredientCategory>(
            "UPDATE ingredient_categories SET name = $2, is_active = $3 WHERE id = $1 \
             RETURNING id, name, is_active",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::IngredientCategory, e))?
        .ok_or(RepoError::NotFound(Entity::IngredientCategory))
    }

    // --- INGREDIENTS ---

    async fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Ingredient, e))
    }

    async fn get_ingredient(&self, id: i32) -> RepoResult<Ingredient> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Ingredient, e))?
        .ok_or(RepoError::NotFound(Entity::Ingredient))
    }

    async fn create_ingredient(&self, input: IngredientInput) -> RepoResult<Ingredient> {
        sqlx::query_as::<_, Ingredient>(&format!(
            "INSERT INTO ingredients \
             (name, calories, expiration_date, is_active, category_id, unit_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {INGREDIENT_COLUMNS}"
        ))
        .bind(input.name)
        .bind(input.calories)
        .bind(input.expiration_date)
        .bind(input.is_active)
        .bind(input.category_id)
        .bind(input.unit_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Ingredient, e))
    }

    async fn update_ingredient(&self, id: i32, input: IngredientInput) -> RepoResult<Ingredient> {
        sqlx::query_as::<_, Ingredient>(&format!(
            r#"
            UPDATE ingredients
            SET name = $2,
                calories = $3,
                expiration_date = $4,
                is_active = $5,
                category_id = $6,
                unit_id = $7
            WHERE id = $1
            RETURNING {INGREDIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.calories)
        .bind(input.expiration_date)
        .bind(input.is_active)
        .bind(input.category_id)
        .bind(input.unit_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::from_sqlx(Entity::Ingredient, e))?
        .ok_or(RepoError::NotFound(Entity::Ingredient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_foreign_key_names_the_missing_row() {
        assert_eq!(
            missing_grant_side(Some("role_permissions_role_id_fkey")),
            Entity::UserRole
        );
        assert_eq!(
            missing_grant_side(Some("role_permissions_permission_id_fkey")),
            Entity::Permission
        );
    }

    #[test]
    fn other_grant_failures_keep_their_classification() {
        assert!(matches!(
            grant_error(sqlx::Error::PoolTimedOut),
            RepoError::Internal(_)
        ));
    }
}
