use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stored user document. The password digest round-trips through the
/// database but is never serialized into a response; handlers answer
/// with [`UserResponse`] instead.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 30, message = "firstName must be 2-30 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 30, message = "lastName must be 2-30 characters"))]
    pub last_name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Partial profile update: absent fields keep their stored value, a
/// supplied password is re-hashed before persisting.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 30, message = "firstName must be 2-30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 30, message = "lastName must be 2-30 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Client-facing projection of a user. No credential field exists here.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            created_at: user
                .created_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
            updated_at: user
                .updated_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::run_validation;

    #[test]
    fn test_register_rejects_short_names() {
        let request = RegisterRequest {
            first_name: "A".to_string(),
            last_name: "Lee".to_string(),
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(run_validation(&request).is_err());
    }

    #[test]
    fn test_register_rejects_malformed_email() {
        let request = RegisterRequest {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(run_validation(&request).is_err());
    }

    #[test]
    fn test_register_rejects_short_password() {
        let request = RegisterRequest {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "a@b.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(run_validation(&request).is_err());
    }

    #[test]
    fn test_register_accepts_valid_input() {
        let request = RegisterRequest {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(run_validation(&request).is_ok());
    }

    #[test]
    fn test_response_has_no_password_field() {
        let user = User {
            id: Some(ObjectId::new()),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "a@b.com".to_string(),
            password: "$2b$10$digest".to_string(),
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        };
        let body = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["email"], "a@b.com");
        assert_eq!(body["firstName"], "Ann");
    }
}
