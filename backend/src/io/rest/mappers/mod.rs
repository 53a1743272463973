//! Conversions between `shared` DTOs and domain types

pub mod attendance_mapper;
pub mod auth_mapper;
pub mod client_mapper;
pub mod event_mapper;
pub mod referral_mapper;
pub mod reservation_mapper;
pub mod stats_mapper;
pub mod waiver_mapper;

use chrono::NaiveDate;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::validation::parse_date;

/// Parse an optional `YYYY-MM-DD` query parameter
pub(crate) fn optional_date(field: &str, value: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| DomainError::field(field, "Use the YYYY-MM-DD date format.")),
    }
}
