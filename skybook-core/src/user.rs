use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{validate_email, ValidationErrors};

pub const CUSTOMER_ROLE: &str = "CUSTOMER";
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        }
        validate_email(&mut errors, "email", &self.email);
        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters long"),
            );
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "long-enough".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            name: " ".to_string(),
            email: "nope".to_string(),
            password: "short".to_string(),
        };
        assert_eq!(bad.validate().unwrap_err().errors().len(), 3);
    }
}
