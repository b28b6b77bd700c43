pub mod bids;
pub mod gigs;
pub mod users;

use std::borrow::Cow;

use validator::{Validate, ValidationError};

/// Every problem `input` has, one message per failed rule, ordered by field.
/// Empty when the input is valid.
pub(crate) fn validation_messages<T: Validate>(input: &T) -> Vec<String> {
    let Err(errors) = input.validate() else {
        return Vec::new();
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, list)| {
            list.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect()
}

/// Length check on the trimmed value, for `#[validate(custom(...))]` rules.
pub(crate) fn trimmed_length(
    value: &str,
    min: usize,
    max: usize,
    too_short: impl Into<Cow<'static, str>>,
    too_long: impl Into<Cow<'static, str>>,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min {
        Err(ValidationError::new("length").with_message(too_short.into()))
    } else if len > max {
        Err(ValidationError::new("length").with_message(too_long.into()))
    } else {
        Ok(())
    }
}
