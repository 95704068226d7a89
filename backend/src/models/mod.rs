//! Data models shared across persistence, decoding and API handlers.

use serde::{Deserialize, Deserializer};

pub mod attachment;
pub mod audit_log;
pub mod case;
pub mod connector;
pub mod find;
pub mod requests;
pub mod user_action;

/// Field must be present but may be `null`.
///
/// Plain `Option<T>` fields default to `None` when the key is absent; routing
/// them through this function turns an absent key into a "missing field"
/// error instead.
pub(crate) fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn present_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
