use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Location {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "New York Office")]
    pub name: String,
    #[schema(example = "123 Broadway, New York, NY 10001", nullable = true)]
    pub address: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewLocation {
    #[schema(example = "New York Office")]
    pub name: String,
    #[schema(example = "123 Broadway, New York, NY 10001")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LocationChanges {
    pub name: Option<String>,
    /// `null` removes the address
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>, nullable = true)]
    pub address: Option<Option<String>>,
}

impl Location {
    pub fn apply(&mut self, changes: &LocationChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(address) = &changes.address {
            self.address = address.clone();
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location {
            id: 1,
            name: "New York Office".into(),
            address: Some("123 Broadway".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn absent_address_is_kept() {
        let changes: LocationChanges = serde_json::from_str(r#"{"name": "NYC"}"#).unwrap();
        let mut loc = location();
        loc.apply(&changes, Utc::now());
        assert_eq!(loc.name, "NYC");
        assert_eq!(loc.address.as_deref(), Some("123 Broadway"));
    }

    #[test]
    fn null_address_is_cleared() {
        let changes: LocationChanges = serde_json::from_str(r#"{"address": null}"#).unwrap();
        assert_eq!(changes.address, Some(None));
        let mut loc = location();
        loc.apply(&changes, Utc::now());
        assert_eq!(loc.address, None);
        assert_eq!(loc.name, "New York Office");
    }
}
