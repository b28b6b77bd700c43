//! Business rules. Each operation resolves to a typed [`AppError`] and runs
//! its store work under [`Store::run`](crate::db::Store::run).

pub mod accounts;
pub mod bids;
pub mod gigs;
pub mod hiring;

use validator::Validate;

use crate::error::AppError;
use crate::models::validation_messages;

/// Reject `input` with every validation message it produces.
pub(crate) fn ensure_valid<T: Validate>(input: &T) -> Result<(), AppError> {
    let errors = validation_messages(input);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
