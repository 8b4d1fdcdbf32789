//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches

pub mod category;
pub mod todo;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: absent yields `None`, `null` yields `Some(None)`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Wrap a core validation message into a `validator` error.
pub(crate) fn validation_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}
