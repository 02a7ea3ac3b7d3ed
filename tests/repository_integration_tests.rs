use chrono::NaiveDate;
use pantry_api::{
    models::{
        IngredientCategoryInput, IngredientInput, NewUser, PermissionInput, UnitInput,
        UserRoleInput,
    },
    repository::{Entity, PostgresRepository, RepoError, Repository},
};
use sqlx::PgPool;
use std::time::{SystemTime, UNIX_EPOCH};

// --- Test Context and Setup ---

/// Holds the pool for a migrated test database. These tests need a live Postgres, so they
/// are ignored by default: `DATABASE_URL=... cargo test -- --ignored`.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

/// Names are unique columns, so every test run needs fresh ones.
fn unique(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{prefix}-{nanos}")
}

fn role_input(name: &str) -> UserRoleInput {
    UserRoleInput {
        name: name.to_string(),
        description: "integration".to_string(),
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_role_create_get_update() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let created = repo.create_user_role(role_input(&unique("role"))).await.unwrap();
    let fetched = repo.get_user_role(created.id).await.unwrap();
    assert_eq!(fetched, created);

    let renamed = unique("renamed");
    let updated = repo
        .update_user_role(created.id, role_input(&renamed))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, renamed);

    let listed = repo.list_user_roles().await.unwrap();
    assert!(listed.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(listed.contains(&updated));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_name_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let name = unique("dup");
    repo.create_permission(PermissionInput {
        name: name.clone(),
        description: String::new(),
    })
    .await
    .unwrap();

    let err = repo
        .create_permission(PermissionInput {
            name,
            description: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(Entity::Permission)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_rows_are_not_found() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    assert!(matches!(
        repo.get_user(i32::MAX).await,
        Err(RepoError::NotFound(Entity::User))
    ));
    assert!(matches!(
        repo.update_unit(
            i32::MAX,
            UnitInput {
                name: unique("unit"),
                is_active: true
            }
        )
        .await,
        Err(RepoError::NotFound(Entity::Unit))
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_grants_are_idempotent() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let role = repo.create_user_role(role_input(&unique("grant"))).await.unwrap();
    let permission = repo
        .create_permission(PermissionInput {
            name: unique("perm"),
            description: String::new(),
        })
        .await
        .unwrap();

    repo.grant_permission(role.id, permission.id).await.unwrap();
    repo.grant_permission(role.id, permission.id).await.unwrap();

    let granted = repo.list_role_permissions(role.id).await.unwrap();
    assert_eq!(granted, vec![permission]);

    assert!(matches!(
        repo.grant_permission(role.id, i32::MAX).await,
        Err(RepoError::NotFound(Entity::Permission))
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_foreign_key_is_conflict() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let username = unique("u");
    let new_user = NewUser {
        email: format!("{username}@example.com"),
        username,
        password_hash: "hash".to_string(),
        account_type: String::new(),
        profile_picture: String::new(),
        role_id: i32::MAX,
        is_active: true,
    };
    assert!(matches!(
        repo.create_user(new_user).await,
        Err(RepoError::Conflict(Entity::User))
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ingredient_with_category_and_unit() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let category = repo
        .create_ingredient_category(IngredientCategoryInput {
            name: unique("cat"),
            is_active: true,
        })
        .await
        .unwrap();
    let unit = repo
        .create_unit(UnitInput {
            name: unique("g"),
            is_active: true,
        })
        .await
        .unwrap();

    let ingredient = repo
        .create_ingredient(IngredientInput {
            name: unique("carrot"),
            calories: 41,
            expiration_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            is_active: true,
            category_id: Some(category.id),
            unit_id: Some(unit.id),
        })
        .await
        .unwrap();

    assert_eq!(ingredient.category_id, Some(category.id));
    assert_eq!(ingredient.unit_id, Some(unit.id));
    assert_eq!(repo.get_ingredient(ingredient.id).await.unwrap(), ingredient);
}
