pub mod attendance;
pub mod client;
pub mod event;
pub mod referral;
pub mod reservation;
pub mod user;

use chrono::{SecondsFormat, Utc};

/// Round a money amount to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Current instant as a sortable RFC 3339 UTC timestamp
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
