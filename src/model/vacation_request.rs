use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Denied,
}

impl VacationStatus {
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, VacationStatus::Pending)
    }
}

impl TryFrom<String> for VacationStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RequestError {
    #[display(fmt = "start_date cannot be after end_date")]
    InvalidRange,
    #[display(fmt = "vacation request is already {}", _0)]
    NotPending(VacationStatus),
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VacationRequest {
    pub id: u64,
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    pub reason: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: VacationStatus,
    pub supervisor_id: Option<u64>,
    pub approval_date: Option<DateTime<Utc>>,
    pub denial_reason_id: Option<u64>,
    pub denial_comments: Option<String>,
    pub denial_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated request ready to be stored as `pending`.
#[derive(Debug, Clone)]
pub struct NewVacationRequest {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    pub reason: Option<String>,
}

/// Inclusive number of calendar days between the two dates.
pub fn days_requested(start_date: NaiveDate, end_date: NaiveDate) -> Result<i64, RequestError> {
    if start_date > end_date {
        return Err(RequestError::InvalidRange);
    }
    Ok((end_date - start_date).num_days() + 1)
}

impl NewVacationRequest {
    pub fn new(
        employee_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Self, RequestError> {
        let days = days_requested(start_date, end_date)?;
        Ok(Self {
            employee_id,
            start_date,
            end_date,
            days_requested: days,
            reason: reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}

impl VacationRequest {
    /// Materializes a stored row for a freshly inserted request.
    pub fn pending(id: u64, draft: NewVacationRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            employee_id: draft.employee_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            days_requested: draft.days_requested,
            reason: draft.reason,
            status: VacationStatus::Pending,
            supervisor_id: None,
            approval_date: None,
            denial_reason_id: None,
            denial_comments: None,
            denial_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn ensure_pending(&self) -> Result<(), RequestError> {
        if self.status.is_terminal() {
            return Err(RequestError::NotPending(self.status));
        }
        Ok(())
    }

    pub fn approve(&mut self, supervisor_id: u64, at: DateTime<Utc>) -> Result<(), RequestError> {
        self.ensure_pending()?;
        self.status = VacationStatus::Approved;
        self.supervisor_id = Some(supervisor_id);
        self.approval_date = Some(at);
        self.updated_at = at;
        Ok(())
    }

    pub fn deny(
        &mut self,
        supervisor_id: u64,
        denial_reason_id: u64,
        denial_comments: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), RequestError> {
        self.ensure_pending()?;
        self.status = VacationStatus::Denied;
        self.supervisor_id = Some(supervisor_id);
        self.denial_reason_id = Some(denial_reason_id);
        self.denial_comments = denial_comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.denial_date = Some(at);
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pending_request() -> VacationRequest {
        let draft = NewVacationRequest::new(
            7,
            date("2024-07-15"),
            date("2024-07-19"),
            Some("Family trip".into()),
        )
        .unwrap();
        VacationRequest::pending(1, draft, Utc::now())
    }

    #[test]
    fn counts_both_endpoints() {
        assert_eq!(days_requested(date("2024-07-15"), date("2024-07-19")), Ok(5));
        assert_eq!(days_requested(date("2024-07-15"), date("2024-07-15")), Ok(1));
        // crosses a month and a leap day
        assert_eq!(days_requested(date("2024-02-28"), date("2024-03-01")), Ok(3));
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(
            days_requested(date("2024-07-19"), date("2024-07-15")),
            Err(RequestError::InvalidRange)
        );
        assert!(NewVacationRequest::new(1, date("2024-07-19"), date("2024-07-15"), None).is_err());
    }

    #[test]
    fn new_request_is_pending_and_clean() {
        let req = pending_request();
        assert_eq!(req.status, VacationStatus::Pending);
        assert_eq!(req.days_requested, 5);
        assert!(req.supervisor_id.is_none());
        assert!(req.approval_date.is_none());
        assert!(req.denial_reason_id.is_none());
        assert!(req.denial_comments.is_none());
        assert!(req.denial_date.is_none());
    }

    #[test]
    fn approve_sets_approval_fields_only() {
        let mut req = pending_request();
        req.approve(3, Utc::now()).unwrap();
        assert_eq!(req.status, VacationStatus::Approved);
        assert_eq!(req.supervisor_id, Some(3));
        assert!(req.approval_date.is_some());
        assert!(req.denial_reason_id.is_none());
        assert!(req.denial_date.is_none());
        assert!(req.denial_comments.is_none());
    }

    #[test]
    fn deny_sets_denial_fields_only() {
        let mut req = pending_request();
        req.deny(3, 2, Some(" busy season ".into()), Utc::now())
            .unwrap();
        assert_eq!(req.status, VacationStatus::Denied);
        assert_eq!(req.supervisor_id, Some(3));
        assert_eq!(req.denial_reason_id, Some(2));
        assert_eq!(req.denial_comments.as_deref(), Some("busy season"));
        assert!(req.denial_date.is_some());
        assert!(req.approval_date.is_none());
    }

    #[test]
    fn terminal_requests_do_not_move() {
        let mut req = pending_request();
        req.approve(3, Utc::now()).unwrap();
        let err = req.deny(3, 2, None, Utc::now()).unwrap_err();
        assert_eq!(err, RequestError::NotPending(VacationStatus::Approved));
        assert_eq!(req.status, VacationStatus::Approved);
        assert!(req.denial_reason_id.is_none());
        assert_eq!(err.to_string(), "vacation request is already approved");
    }
}
