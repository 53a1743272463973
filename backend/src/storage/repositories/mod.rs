//! SQLite implementations of the storage traits

pub mod attendance_repository;
pub mod client_repository;
pub mod event_repository;
pub mod referral_repository;
pub mod reservation_repository;
pub mod user_repository;

pub use attendance_repository::AttendanceRepository;
pub use client_repository::ClientRepository;
pub use event_repository::EventRepository;
pub use referral_repository::ReferralRepository;
pub use reservation_repository::ReservationRepository;
pub use user_repository::UserRepository;

/// Condition over an `events` row that holds while the event is not
/// cancelled and has a free place. Active reservations count as taken.
pub(crate) const EVENT_HAS_OPEN_PLACE: &str = r#"
    status != 'cancelled'
    AND (capacity IS NULL
         OR attendee_count + (SELECT COUNT(*) FROM reservations held
                              WHERE held.event_id = events.id AND held.state = 'reserved') < capacity)
"#;

/// Build a `LIKE` pattern matching `query` anywhere, with `%`, `_` and the
/// escape character itself taken literally. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ana"), "%ana%");
        assert_eq!(contains_pattern(" 50% "), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
