use chrono::NaiveDate;
use pantry_api::models::{
    IngredientInput, NewUser, PermissionInput, User, UserInput, UserRoleInput,
};
use serde_json::json;
use validator::Validate;

fn user_input(email: &str) -> UserInput {
    serde_json::from_value(json!({
        "username": " johndoe ",
        "email": email,
        "password": "password",
        "account_type": "admin",
        "profile_picture": "",
        "role_id": 1,
        "is_active": true
    }))
    .unwrap()
}

#[test]
fn test_user_json_never_carries_a_password() {
    let user = User {
        id: 7,
        username: "johndoe".to_string(),
        email: "johndoe@gmail.com".to_string(),
        account_type: "admin".to_string(),
        profile_picture: "profile.jpg".to_string(),
        role_id: 1,
        is_active: true,
    };

    let json_output = serde_json::to_value(&user).unwrap();
    assert!(json_output.get("password").is_none());
    assert!(json_output.get("password_hash").is_none());
    assert_eq!(json_output["role_id"], 1);
}

#[test]
fn test_user_input_trims_and_validates_email() {
    let input = user_input("  johndoe@gmail.com  ");
    assert_eq!(input.username, "johndoe");
    assert_eq!(input.email, "johndoe@gmail.com");
    assert!(input.validate().is_ok());

    let bad = user_input("johndoe-at-gmail");
    let errors = bad.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("email"));
}

#[test]
fn test_new_user_carries_hash_not_plaintext() {
    let new_user = NewUser::from_input(user_input("a@b.co"), "$argon2id$stub".to_string());
    assert_eq!(new_user.password_hash, "$argon2id$stub");
    assert_eq!(new_user.username, "johndoe");
}

#[test]
fn test_length_limits() {
    let role = UserRoleInput {
        name: "x".repeat(30),
        description: "y".repeat(100),
    };
    assert!(role.validate().is_ok());

    let too_long = PermissionInput {
        name: "x".repeat(31),
        description: String::new(),
    };
    assert!(too_long.validate().is_err());

    let long_description = PermissionInput {
        name: "ok".to_string(),
        description: "y".repeat(101),
    };
    assert!(long_description.validate().is_err());
}

#[test]
fn test_ingredient_input_optional_references() {
    let input: IngredientInput = serde_json::from_value(json!({
        "name": "Carrot",
        "calories": 0,
        "expiration_date": "2025-12-31",
        "is_active": true
    }))
    .unwrap();

    assert_eq!(input.category_id, None);
    assert_eq!(input.unit_id, None);
    assert_eq!(
        input.expiration_date,
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    );
    assert!(input.validate().is_ok());
}

#[test]
fn test_ingredient_rejects_malformed_date() {
    let result = serde_json::from_value::<IngredientInput>(json!({
        "name": "Carrot",
        "calories": 41,
        "expiration_date": "31/12/2025",
        "is_active": true
    }));
    assert!(result.is_err());
}
