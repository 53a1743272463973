//! # Storage Module
//!
//! SQLite persistence for the console. The domain layer only sees the
//! traits in [`traits`]; [`repositories`] holds the sqlx implementations and
//! [`error`] classifies driver failures into constraint categories.
//!
//! Uniqueness rules (one live reservation per client and event, one
//! attendance per client and event, one referral per referrer and referred
//! client) are enforced by indexes created in [`connection`].

pub mod connection;
pub mod error;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use error::{StorageError, StorageResult};
pub use repositories::{
    AttendanceRepository, ClientRepository, EventRepository, ReferralRepository, ReservationRepository,
    UserRepository,
};
pub use traits::{
    AttendanceStorage, ClientStorage, EventStorage, ReferralStorage, ReservationStorage, UserStorage,
};
