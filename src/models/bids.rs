use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use crate::models::trimmed_length;

/// Bid status stored as a lowercase string in the database.
///
/// `Hired` and `Rejected` are terminal: a bid in either state can no longer
/// be edited or withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "hired")]
    Hired,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// SeaORM entity for the `bids` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freelancer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

pub const MIN_MESSAGE: usize = 10;
pub const MAX_MESSAGE: usize = 1000;
pub const MIN_PRICE: f64 = 1.0;
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Request body for `POST /bids`. The freelancer comes from the credential.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBid {
    pub gig_id: Uuid,
    #[validate(custom(function = "validate_message"))]
    pub message: String,
    #[validate(range(min = 1.0, max = 1_000_000.0, message = "Price must be between 1 and 1000000"))]
    pub price: f64,
}

/// Partial update for a pending bid.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBid {
    #[validate(custom(function = "validate_message"))]
    pub message: Option<String>,
    #[validate(range(min = 1.0, max = 1_000_000.0, message = "Price must be between 1 and 1000000"))]
    pub price: Option<f64>,
}

impl UpdateBid {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.price.is_none()
    }
}

fn validate_message(message: &str) -> Result<(), ValidationError> {
    trimmed_length(
        message,
        MIN_MESSAGE,
        MAX_MESSAGE,
        format!("Message must be at least {MIN_MESSAGE} characters"),
        format!("Message cannot exceed {MAX_MESSAGE} characters"),
    )
}
