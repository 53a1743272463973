//! Domain-level command types.
//!
//! Services take these instead of the public DTOs in `shared`; the REST
//! mappers translate between the two.

pub mod clients {
    #[derive(Debug, Clone, Default)]
    pub struct CreateClientCommand {
        pub first_name: String,
        pub last_name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub comments: Option<String>,
    }

    /// `None` keeps the stored value
    #[derive(Debug, Clone, Default)]
    pub struct UpdateClientCommand {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub comments: Option<String>,
    }
}

pub mod events {
    use shared::EventStatus;

    #[derive(Debug, Clone, Default)]
    pub struct CreateEventCommand {
        pub name: String,
        pub location: String,
        /// Raw `YYYY-MM-DD` input, validated by the service
        pub scheduled_date: Option<String>,
        pub capacity: Option<i64>,
        pub expense: f64,
        pub comments: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateEventCommand {
        pub name: Option<String>,
        pub location: Option<String>,
        pub scheduled_date: Option<String>,
        /// `Some(None)` removes the limit
        pub capacity: Option<Option<i64>>,
        pub expense: Option<f64>,
        pub status: Option<EventStatus>,
        pub comments: Option<String>,
    }
}

pub mod referrals {
    use shared::ReferralStatus;

    #[derive(Debug, Clone, Default)]
    pub struct CreateReferralCommand {
        pub referrer_id: Option<i64>,
        pub referred_client_id: Option<i64>,
        pub prospect_name: Option<String>,
        pub prospect_email: Option<String>,
        pub prospect_phone: Option<String>,
        pub comments: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateReferralCommand {
        pub status: Option<ReferralStatus>,
        pub prospect_email: Option<String>,
        pub prospect_phone: Option<String>,
        pub comments: Option<String>,
    }
}

pub mod reservations {
    #[derive(Debug, Clone, Default)]
    pub struct CreateReservationCommand {
        pub client_id: Option<i64>,
        pub event_id: Option<i64>,
        pub deposit: Option<f64>,
        pub expected_total: Option<f64>,
        pub comments: Option<String>,
    }
}

pub mod attendance {
    #[derive(Debug, Clone, Default)]
    pub struct WalkInCommand {
        pub client_id: Option<i64>,
        pub event_id: Option<i64>,
        pub amount: Option<f64>,
    }
}

pub mod waivers {
    use chrono::NaiveDate;

    /// Which clients receive a waiver in a batch
    #[derive(Debug, Clone, PartialEq)]
    pub enum WaiverSelection {
        Event(i64),
        DateRange { from: NaiveDate, to: NaiveDate },
        Clients(Vec<i64>),
        AllActive,
    }
}

pub mod exports {
    /// A rendered file ready to download
    #[derive(Debug, Clone)]
    pub struct Download {
        pub filename: String,
        pub content_type: &'static str,
        pub bytes: Vec<u8>,
    }
}

pub mod auth {
    #[derive(Debug, Clone)]
    pub struct SignUpCommand {
        pub email: String,
        pub password: String,
        pub display_name: Option<String>,
    }
}
