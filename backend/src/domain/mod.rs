//! # Domain Module
//!
//! Business rules for the console: validation of operator input, the
//! reservation and attendance lifecycle, dashboard figures, CSV exports,
//! waiver documents and account sessions.
//!
//! Services depend only on the storage traits, so each can be exercised
//! against an in-memory database in isolation.

pub mod attendance_service;
pub mod auth_service;
pub mod client_service;
pub mod commands;
pub mod error;
pub mod event_service;
pub mod export_service;
pub mod filters;
pub mod models;
pub mod referral_service;
pub mod reservation_service;
pub mod stats_service;
pub mod validation;
pub mod waiver_service;

pub use attendance_service::AttendanceService;
pub use auth_service::AuthService;
pub use client_service::ClientService;
pub use error::{DomainError, DomainResult};
pub use event_service::EventService;
pub use export_service::ExportService;
pub use referral_service::ReferralService;
pub use reservation_service::ReservationService;
pub use stats_service::{Dashboard, StatsService};
pub use waiver_service::WaiverService;
