use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use crate::models::trimmed_length;

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::gigs::Entity")]
    Gigs,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gigs.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB, used for request bodies) ──

/// Used by the `POST /auth/register` endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Used by the `POST /auth/login` endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(custom(function = "validate_login_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    trimmed_length(name, 1, 50, "Name is required", "Name cannot exceed 50 characters")
}

fn validate_login_email(email: &str) -> Result<(), ValidationError> {
    trimmed_length(email, 1, usize::MAX, "Email is required", "")
}

/// A safe user representation for API responses (never leaks the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation_messages;

    fn register(name: &str, email: &str, password: &str) -> RegisterUser {
        RegisterUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(validation_messages(&register("Ada", "ada@example.com", "secret1")).is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let errors = validation_messages(&register("  ", "not-an-email", "123"));
        assert_eq!(
            errors,
            vec![
                "Please provide a valid email",
                "Name is required",
                "Password must be at least 6 characters",
            ]
        );
    }

    #[test]
    fn email_shapes() {
        let email_ok = |email: &str| validation_messages(&register("Ada", email, "secret1")).is_empty();
        assert!(email_ok("a@b.io"));
        assert!(!email_ok("@b.io"));
        assert!(!email_ok("a b@c.io"));
        assert!(!email_ok("a@@c.io"));
    }

    #[test]
    fn name_is_measured_after_trimming() {
        let long = "x".repeat(51);
        assert_eq!(
            validation_messages(&register(&long, "ada@example.com", "secret1")),
            vec!["Name cannot exceed 50 characters"]
        );
        assert!(validation_messages(&register("  Ada  ", "ada@example.com", "secret1")).is_empty());
    }

    #[test]
    fn login_requires_both_fields() {
        let login = LoginUser {
            email: "   ".to_string(),
            password: String::new(),
        };
        assert_eq!(
            validation_messages(&login),
            vec!["Email is required", "Password is required"]
        );
    }

    #[test]
    fn response_omits_password_hash() {
        let model = Model {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordHash"));
    }
}
