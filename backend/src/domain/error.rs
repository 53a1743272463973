//! Domain error taxonomy and the translation of storage constraint
//! failures into sentences an operator can act on.

use shared::FieldError;
use thiserror::Error;

use super::models::event::Event;
use crate::storage::StorageError;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound { entity, id: id.to_string() }
    }

    pub fn field(field: &str, message: &str) -> Self {
        DomainError::Validation(vec![FieldError::new(field, message)])
    }

    /// An event refused a new place: it is missing, cancelled or full
    pub fn event_unavailable(event: Option<&Event>) -> Self {
        match event {
            None => DomainError::InvalidReference("The selected client or event does not exist.".to_string()),
            Some(event) if event.is_cancelled() => {
                DomainError::Conflict(format!("The event '{}' has been cancelled.", event.name))
            }
            Some(event) => DomainError::Conflict(format!("The event '{}' is full.", event.name)),
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        translate_storage_error(err)
    }
}

/// Map a constraint violation to a user-facing error, keyed on the table,
/// column or constraint name the driver reports. Unknown messages keep the
/// raw driver text.
pub fn translate_storage_error(err: StorageError) -> DomainError {
    match err {
        StorageError::UniqueViolation(msg) => {
            let sentence = if msg.contains("reservations.") {
                "This client already has a place reserved for this event."
            } else if msg.contains("attendances.") {
                "This client's attendance at this event is already recorded."
            } else if msg.contains("referrals.") {
                "This referral has already been recorded."
            } else if msg.contains("users.email") {
                "An account with this email already exists."
            } else {
                return DomainError::Duplicate(msg);
            };
            DomainError::Duplicate(sentence.to_string())
        }
        StorageError::ForeignKeyViolation(_) => {
            DomainError::InvalidReference("The selected client or event does not exist.".to_string())
        }
        StorageError::CheckViolation(msg) => {
            let mapped = if msg.contains("chk_reservations_amounts") {
                Some((
                    "deposit",
                    "The deposit and total must be greater than zero, and the total cannot be less than the deposit.",
                ))
            } else if msg.contains("chk_attendances_amounts") {
                Some(("amount", "Payment amounts must be greater than zero."))
            } else if msg.contains("chk_events_expense") {
                Some(("expense", "The expense must be between 0 and 999,999.99."))
            } else if msg.contains("chk_events_capacity") {
                Some(("capacity", "The capacity must be greater than zero."))
            } else if msg.contains("chk_referrals_self") {
                Some(("referred_client_id", "A client cannot refer themselves."))
            } else if msg.contains("chk_referrals_target") {
                Some(("prospect_name", "Select a referred client or enter the prospect's name."))
            } else {
                None
            };
            match mapped {
                Some((field, sentence)) => DomainError::field(field, sentence),
                None => DomainError::Validation(vec![FieldError::new("form", msg)]),
            }
        }
        StorageError::NotNullViolation(msg) => {
            let column = msg.rsplit('.').next().unwrap_or("form").trim().to_string();
            DomainError::Validation(vec![FieldError::new(column, "This field is required.")])
        }
        other => DomainError::Storage(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_reservation_sentence() {
        let err = translate_storage_error(StorageError::UniqueViolation(
            "UNIQUE constraint failed: reservations.client_id, reservations.event_id".to_string(),
        ));
        match err {
            DomainError::Duplicate(msg) => {
                assert_eq!(msg, "This client already has a place reserved for this event.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_unique_keeps_raw_message() {
        let err = translate_storage_error(StorageError::UniqueViolation("UNIQUE constraint failed: x.y".to_string()));
        assert_eq!(err.to_string(), "UNIQUE constraint failed: x.y");
    }

    #[test]
    fn test_check_and_not_null_become_field_errors() {
        let err = translate_storage_error(StorageError::CheckViolation(
            "CHECK constraint failed: chk_referrals_self".to_string(),
        ));
        match err {
            DomainError::Validation(errors) => assert_eq!(errors[0].field, "referred_client_id"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = translate_storage_error(StorageError::NotNullViolation(
            "NOT NULL constraint failed: clients.first_name".to_string(),
        ));
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors[0].field, "first_name");
                assert_eq!(errors[0].message, "This field is required.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_and_database_errors() {
        let err = translate_storage_error(StorageError::ForeignKeyViolation("FOREIGN KEY constraint failed".to_string()));
        assert!(matches!(err, DomainError::InvalidReference(_)));

        let err = translate_storage_error(StorageError::Database("disk I/O error".to_string()));
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
