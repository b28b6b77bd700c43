use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{bids, gigs, users};

/// The identity resolved from a verified credential.
///
/// Ownership rules are expressed as capability checks on the caller rather
/// than comparing ids at each call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<users::Model> for Caller {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl Caller {
    pub fn owns_gig(&self, gig: &gigs::Model) -> bool {
        gig.owner_id == self.id
    }

    /// Only the gig owner may edit, delete, list bids on, or hire for a gig.
    pub fn ensure_owns_gig(&self, gig: &gigs::Model) -> Result<(), AppError> {
        if self.owns_gig(gig) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You are not authorized to manage this gig".to_string(),
            ))
        }
    }

    /// Only the freelancer who placed a bid may edit or withdraw it.
    pub fn ensure_owns_bid(&self, bid: &bids::Model) -> Result<(), AppError> {
        if bid.freelancer_id == self.id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You are not authorized to modify this bid".to_string(),
            ))
        }
    }

    /// A gig owner can never bid on their own gig.
    pub fn ensure_can_bid_on(&self, gig: &gigs::Model) -> Result<(), AppError> {
        if self.owns_gig(gig) {
            Err(AppError::Forbidden(
                "You cannot bid on your own gig".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
