use serde::{Deserialize, Deserializer};

pub mod denial_reason;
pub mod employee;
pub mod location;
pub mod role;
pub mod vacation_request;

/// For partial updates: an absent field stays `None` (via `#[serde(default)]`),
/// an explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
