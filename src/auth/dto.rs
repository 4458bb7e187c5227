use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::repo::{User, UserRole};

/// Request body for user registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    pub role: UserRole,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        }
    }
}

/// Response returned after register or login; the token itself travels in
/// the cookie, never in the body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_short_passwords_and_bad_emails() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "short".into(),
            full_name: "Jane Doe".into(),
            role: UserRole::Jobseeker,
        };
        let errs = req.validate().unwrap_err();
        let rendered = format!("{errs:?}");
        assert!(rendered.contains("email"));
        assert!(rendered.contains("password"));
    }

    #[test]
    fn auth_response_contains_no_token_field() {
        let response = AuthResponse {
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "jane@doe.test".into(),
                full_name: "Jane Doe".into(),
                role: UserRole::Employer,
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("jane@doe.test"));
        assert!(json.contains(r#""role":"employer""#));
        assert!(!json.contains("token"));
    }
}
