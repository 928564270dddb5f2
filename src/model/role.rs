use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Employee,
    Supervisor,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_stored_names() {
        assert_eq!(Role::from_str("supervisor").unwrap(), Role::Supervisor);
        assert_eq!(Role::Administrator.as_str(), "administrator");
        assert!(Role::from_str("hr").is_err());
    }
}
