use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DenialReason {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Staffing Shortage")]
    pub reason: String,
    #[schema(example = "Not enough coverage available during requested period", nullable = true)]
    pub description: Option<String>,
    #[schema(example = true)]
    pub active: bool,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewDenialReason {
    #[schema(example = "Staffing Shortage")]
    pub reason: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DenialReasonChanges {
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>, nullable = true)]
    pub description: Option<Option<String>>,
    pub active: Option<bool>,
}

impl DenialReason {
    pub fn apply(&mut self, changes: &DenialReasonChanges, now: DateTime<Utc>) {
        if let Some(reason) = &changes.reason {
            self.reason = reason.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_description_is_cleared_and_absent_kept() {
        let now = Utc::now();
        let mut reason = DenialReason {
            id: 1,
            reason: "Staffing Shortage".into(),
            description: Some("Not enough coverage".into()),
            active: true,
            created_at: now,
            updated_at: now,
        };

        let keep: DenialReasonChanges = serde_json::from_str(r#"{"active": false}"#).unwrap();
        reason.apply(&keep, now);
        assert!(!reason.active);
        assert_eq!(reason.description.as_deref(), Some("Not enough coverage"));

        let clear: DenialReasonChanges = serde_json::from_str(r#"{"description": null}"#).unwrap();
        reason.apply(&clear, now);
        assert_eq!(reason.description, None);
    }
}
