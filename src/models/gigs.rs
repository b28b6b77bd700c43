use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use crate::models::trimmed_length;

/// Gig status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum GigStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "assigned")]
    Assigned,
}

/// SeaORM entity for the `gigs` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gigs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    pub owner_id: Uuid,
    pub status: GigStatus,
    pub hired_bid_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

const MAX_TITLE: usize = 100;
const MAX_DESCRIPTION: usize = 5000;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGig {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Budget must be a positive number"))]
    pub budget: f64,
}

/// Partial update: only fields present in the request body are applied, and
/// only those are validated.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGig {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Budget must be a positive number"))]
    pub budget: Option<f64>,
}

impl UpdateGig {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.budget.is_none()
    }
}

/// Query string for `GET /gigs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GigListQuery {
    pub search: Option<String>,
    pub status: Option<GigStatus>,
}

impl GigListQuery {
    pub fn status(&self) -> GigStatus {
        self.status.unwrap_or(GigStatus::Open)
    }

    /// The trimmed search needle, if one was given.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    trimmed_length(
        title,
        1,
        MAX_TITLE,
        "Title is required",
        format!("Title cannot exceed {MAX_TITLE} characters"),
    )
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    trimmed_length(
        description,
        1,
        MAX_DESCRIPTION,
        "Description is required",
        format!("Description cannot exceed {MAX_DESCRIPTION} characters"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation_messages;

    #[test]
    fn create_requires_positive_budget() {
        let gig = CreateGig {
            title: "Build a React dashboard".to_string(),
            description: "Charts and tables".to_string(),
            budget: 0.0,
        };
        assert_eq!(validation_messages(&gig), vec!["Budget must be a positive number"]);
    }

    #[test]
    fn update_validates_only_present_fields() {
        let update = UpdateGig {
            budget: Some(250.0),
            ..Default::default()
        };
        assert!(validation_messages(&update).is_empty());

        let cleared = UpdateGig {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(validation_messages(&cleared), vec!["Title is required"]);

        let too_long = UpdateGig {
            description: Some("d".repeat(MAX_DESCRIPTION + 1)),
            budget: Some(-5.0),
            ..Default::default()
        };
        assert_eq!(
            validation_messages(&too_long),
            vec![
                "Budget must be a positive number",
                "Description cannot exceed 5000 characters",
            ]
        );
    }

    #[test]
    fn list_query_defaults_to_open_and_ignores_blank_search() {
        let query = GigListQuery {
            search: Some("   ".to_string()),
            status: None,
        };
        assert_eq!(query.status(), GigStatus::Open);
        assert_eq!(query.search(), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GigStatus::Assigned).unwrap(),
            "\"assigned\""
        );
    }
}
