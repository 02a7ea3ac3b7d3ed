use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Entity, RepoError, RepoResult, Repository};
use crate::models::{
    Ingredient, IngredientCategory, IngredientCategoryInput, IngredientInput, NewUser, Permission,
    PermissionInput, Unit, UnitInput, User, UserRole, UserRoleInput,
};

/// A table keyed by surrogate id, with the id sequence kept alongside the rows.
/// Like a SERIAL column, ids start at 1 and are never reused.
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn get(&self, entity: Entity, id: i32) -> RepoResult<T> {
        self.rows.get(&id).cloned().ok_or(RepoError::NotFound(entity))
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    /// True when a row other than `except` already carries `key` in the unique column `column`.
    fn is_taken<F>(&self, except: Option<i32>, column: F, key: &str) -> bool
    where
        F: Fn(&T) -> &str,
    {
        self.rows
            .iter()
            .any(|(id, row)| Some(*id) != except && column(row) == key)
    }

    fn insert_with<F>(&mut self, build: F) -> T
    where
        F: FnOnce(i32) -> T,
    {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn replace(&mut self, id: i32, row: T) -> T {
        self.rows.insert(id, row.clone());
        row
    }
}

/// Stored user row. Unlike `User` it keeps the password hash.
#[derive(Clone)]
struct UserRow {
    user: User,
    password_hash: String,
}

struct Tables {
    user_roles: Table<UserRole>,
    permissions: Table<Permission>,
    role_permissions: BTreeSet<(i32, i32)>,
    users: Table<UserRow>,
    units: Table<Unit>,
    ingredient_categories: Table<IngredientCategory>,
    ingredients: Table<Ingredient>,
}

/// InMemoryRepository
///
/// A `Repository` that keeps every table in process memory. It enforces the same unique
/// natural keys and foreign keys as the Postgres schema, so handlers see the same
/// `NotFound`/`Conflict` outcomes. Used by the test suite and by `STORAGE_BACKEND=memory`.
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                user_roles: Table::new(),
                permissions: Table::new(),
                role_permissions: BTreeSet::new(),
                users: Table::new(),
                units: Table::new(),
                ingredient_categories: Table::new(),
                ingredients: Table::new(),
            }),
        }
    }

    /// The stored password hash for a user, for verifying what `create_user` persisted.
    pub async fn password_hash(&self, user_id: i32) -> Option<String> {
        let tables = self.tables.read().await;
        tables
            .users
            .rows
            .get(&user_id)
            .map(|row| row.password_hash.clone())
    }
}

impl Tables {
    fn check_user(&self, except: Option<i32>, user: &NewUser) -> RepoResult<()> {
        let username_taken = self
            .users
            .is_taken(except, |row| row.user.username.as_str(), &user.username);
        let email_taken = self.users.is_taken(except, |row| row.user.email.as_str(), &user.email);
        if username_taken || email_taken || !self.user_roles.contains(user.role_id) {
            return Err(RepoError::Conflict(Entity::User));
        }
        Ok(())
    }

    fn check_ingredient(&self, except: Option<i32>, input: &IngredientInput) -> RepoResult<()> {
        let dangling_category = input
            .category_id
            .is_some_and(|id| !self.ingredient_categories.contains(id));
        let dangling_unit = input.unit_id.is_some_and(|id| !self.units.contains(id));
        if self.ingredients.is_taken(except, |row| row.name.as_str(), &input.name)
            || dangling_category
            || dangling_unit
        {
            return Err(RepoError::Conflict(Entity::Ingredient));
        }
        Ok(())
    }
}

fn user_from(id: i32, user: &NewUser) -> UserRow {
    UserRow {
        user: User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            account_type: user.account_type.clone(),
            profile_picture: user.profile_picture.clone(),
            role_id: user.role_id,
            is_active: user.is_active,
        },
        password_hash: user.password_hash.clone(),
    }
}

fn ingredient_from(id: i32, input: IngredientInput) -> Ingredient {
    Ingredient {
        id,
        name: input.name,
        calories: input.calories,
        expiration_date: input.expiration_date,
        is_active: input.is_active,
        category_id: input.category_id,
        unit_id: input.unit_id,
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- USER ROLES ---

    async fn list_user_roles(&self) -> RepoResult<Vec<UserRole>> {
        Ok(self.tables.read().await.user_roles.all())
    }

    async fn get_user_role(&self, id: i32) -> RepoResult<UserRole> {
        self.tables.read().await.user_roles.get(Entity::UserRole, id)
    }

    async fn create_user_role(&self, input: UserRoleInput) -> RepoResult<UserRole> {
        let mut tables = self.tables.write().await;
        if tables.user_roles.is_taken(None, |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::UserRole));
        }
        Ok(tables.user_roles.insert_with(|id| UserRole {
            id,
            name: input.name,
            description: input.description,
        }))
    }

    async fn update_user_role(&self, id: i32, input: UserRoleInput) -> RepoResult<UserRole> {
        let mut tables = self.tables.write().await;
        tables.user_roles.get(Entity::UserRole, id)?;
        if tables.user_roles.is_taken(Some(id), |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::UserRole));
        }
        Ok(tables.user_roles.replace(
            id,
            UserRole {
                id,
                name: input.name,
                description: input.description,
            },
        ))
    }

    // --- PERMISSIONS ---

    async fn list_permissions(&self) -> RepoResult<Vec<Permission>> {
        Ok(self.tables.read().await.permissions.all())
    }

    async fn get_permission(&self, id: i32) -> RepoResult<Permission> {
        self.tables.read().await.permissions.get(Entity::Permission, id)
    }

    async fn create_permission(&self, input: PermissionInput) -> RepoResult<Permission> {
        let mut tables = self.tables.write().await;
        if tables.permissions.is_taken(None, |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::Permission));
        }
        Ok(tables.permissions.insert_with(|id| Permission {
            id,
            name: input.name,
            description: input.description,
        }))
    }

    async fn update_permission(&self, id: i32, input: PermissionInput) -> RepoResult<Permission> {
        let mut tables = self.tables.write().await;
        tables.permissions.get(Entity::Permission, id)?;
        if tables.permissions.is_taken(Some(id), |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::Permission));
        }
        Ok(tables.permissions.replace(
            id,
            Permission {
                id,
                name: input.name,
                description: input.description,
            },
        ))
    }

    // --- ROLE PERMISSIONS ---

    async fn list_role_permissions(&self, role_id: i32) -> RepoResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        if !tables.user_roles.contains(role_id) {
            return Err(RepoError::NotFound(Entity::UserRole));
        }
        Ok(tables
            .role_permissions
            .range((role_id, i32::MIN)..=(role_id, i32::MAX))
            .filter_map(|(_, permission_id)| tables.permissions.rows.get(permission_id).cloned())
            .collect())
    }

    async fn grant_permission(&self, role_id: i32, permission_id: i32) -> RepoResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.user_roles.contains(role_id) {
            return Err(RepoError::NotFound(Entity::UserRole));
        }
        if !tables.permissions.contains(permission_id) {
            return Err(RepoError::NotFound(Entity::Permission));
        }
        tables.role_permissions.insert((role_id, permission_id));
        Ok(())
    }

    // --- USERS ---

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().map(|row| row.user.clone()).collect())
    }

    async fn get_user(&self, id: i32) -> RepoResult<User> {
        let tables = self.tables.read().await;
        tables.users.get(Entity::User, id).map(|row| row.user)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_user(None, &user)?;
        Ok(tables.users.insert_with(|id| user_from(id, &user)).user)
    }

    async fn update_user(&self, id: i32, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        tables.users.get(Entity::User, id)?;
        tables.check_user(Some(id), &user)?;
        Ok(tables.users.replace(id, user_from(id, &user)).user)
    }

    // --- UNITS ---

    async fn list_units(&self) -> RepoResult<Vec<Unit>> {
        Ok(self.tables.read().await.units.all())
    }

    async fn get_unit(&self, id: i32) -> RepoResult<Unit> {
        self.tables.read().await.units.get(Entity::Unit, id)
    }

    async fn create_unit(&self, input: UnitInput) -> RepoResult<Unit> {
        let mut tables = self.tables.write().await;
        if tables.units.is_taken(None, |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::Unit));
        }
        Ok(tables.units.insert_with(|id| Unit {
            id,
            name: input.name,
            is_active: input.is_active,
        }))
    }

    async fn update_unit(&self, id: i32, input: UnitInput) -> RepoResult<Unit> {
        let mut tables = self.tables.write().await;
        tables.units.get(Entity::Unit, id)?;
        if tables.units.is_taken(Some(id), |row| row.name.as_str(), &input.name) {
            return Err(RepoError::Conflict(Entity::Unit));
        }
        Ok(tables.units.replace(
            id,
            Unit {
                id,
                name: input.name,
                is_active: input.is_active,
            },
        ))
    }

    // --- INGREDIENT CATEGORIES ---

    async fn list_ingredient_categories(&self) -> RepoResult<Vec<IngredientCategory>> {
        Ok(self.tables.read().await.ingredient_categories.all())
    }

    async fn get_ingredient_category(&self, id: i32) -> RepoResult<IngredientCategory> {
        self.tables
            .read()
            .await
            .ingredient_categories
            .get(Entity::IngredientCategory, id)
    }

    async fn create_ingredient_category(
        &self,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory> {
        let mut tables = self.tables.write().await;
        if tables
            .ingredient_categories
            .is_taken(None, |row| row.name.as_str(), &input.name)
        {
            return Err(RepoError::Conflict(Entity::IngredientCategory));
        }
        Ok(tables.ingredient_categories.insert_with(|id| IngredientCategory {
            id,
            name: input.name,
            is_active: input.is_active,
        }))
    }

    async fn update_ingredient_category(
        &self,
        id: i32,
        input: IngredientCategoryInput,
    ) -> RepoResult<IngredientCategory> {
        let mut tables = self.tables.write().await;
        tables
            .ingredient_categories
            .get(Entity::IngredientCategory, id)?;
        if tables
            .ingredient_categories
            .is_taken(Some(id), |row| row.name.as_str(), &input.name)
        {
            return Err(RepoError::Conflict(Entity::IngredientCategory));
        }
        Ok(tables.ingredient_categories.replace(
            id,
            IngredientCategory {
                id,
                name: input.name,
                is_active: input.is_active,
            },
        ))
    }

    // --- INGREDIENTS ---

    async fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        Ok(self.tables.read().await.ingredients.all())
    }

    async fn get_ingredient(&self, id: i32) -> RepoResult<Ingredient> {
        self.tables.read().await.ingredients.get(Entity::Ingredient, id)
    }

    async fn create_ingredient(&self, input: IngredientInput) -> RepoResult<Ingredient> {
        let mut tables = self.tables.write().await;
        tables.check_ingredient(None, &input)?;
        Ok(tables
            .ingredients
            .insert_with(|id| ingredient_from(id, input)))
    }

    async fn update_ingredient(&self, id: i32, input: IngredientInput) -> RepoResult<Ingredient> {
        let mut tables = self.tables.write().await;
        tables.ingredients.get(Entity::Ingredient, id)?;
        tables.check_ingredient(Some(id), &input)?;
        Ok(tables.ingredients.replace(id, ingredient_from(id, input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> UserRoleInput {
        UserRoleInput {
            name: name.to_string(),
            description: format!("{name} role"),
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_a_conflict() {
        let repo = InMemoryRepository::new();

        let first = repo.create_user_role(role("Admin")).await.unwrap();
        assert!(matches!(
            repo.create_user_role(role("Admin")).await,
            Err(RepoError::Conflict(Entity::UserRole))
        ));
        let second = repo.create_user_role(role("Cook")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_natural_key() {
        let repo = InMemoryRepository::new();
        let created = repo.create_user_role(role("Admin")).await.unwrap();

        let updated = repo
            .update_user_role(
                created.id,
                UserRoleInput {
                    name: "Admin".to_string(),
                    description: "Still the admin.".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description, "Still the admin.");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found_before_conflict() {
        let repo = InMemoryRepository::new();
        repo.create_user_role(role("Admin")).await.unwrap();

        assert!(matches!(
            repo.update_user_role(99, role("Admin")).await,
            Err(RepoError::NotFound(Entity::UserRole))
        ));
    }
}
