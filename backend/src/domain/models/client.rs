use shared::{LoyaltyTier, SpendLevel};

/// A registered client of the center
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comments: Option<String>,
    pub visits: i64,
    pub accumulated_amount: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Profile fields for a client that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub comments: Option<String>,
    pub created_at: String,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn loyalty_tier(&self) -> LoyaltyTier {
        match self.visits {
            v if v <= 0 => LoyaltyTier::New,
            1..=2 => LoyaltyTier::Occasional,
            3..=5 => LoyaltyTier::Regular,
            6..=10 => LoyaltyTier::Frequent,
            _ => LoyaltyTier::Vip,
        }
    }

    pub fn spend_level(&self) -> SpendLevel {
        let amount = self.accumulated_amount;
        if amount >= 5000.0 {
            SpendLevel::High
        } else if amount >= 2000.0 {
            SpendLevel::Medium
        } else if amount >= 500.0 {
            SpendLevel::Low
        } else {
            SpendLevel::New
        }
    }

    /// Average paid per visit, zero before the first visit
    pub fn average_per_visit(&self) -> f64 {
        if self.visits > 0 {
            super::round_cents(self.accumulated_amount / self.visits as f64)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(visits: i64, accumulated_amount: f64) -> Client {
        Client {
            id: 1,
            first_name: "Ana".to_string(),
            last_name: "López".to_string(),
            phone: None,
            email: None,
            address: None,
            comments: None,
            visits,
            accumulated_amount,
            is_active: true,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_loyalty_tier_boundaries() {
        assert_eq!(client_with(0, 0.0).loyalty_tier(), LoyaltyTier::New);
        assert_eq!(client_with(2, 0.0).loyalty_tier(), LoyaltyTier::Occasional);
        assert_eq!(client_with(3, 0.0).loyalty_tier(), LoyaltyTier::Regular);
        assert_eq!(client_with(10, 0.0).loyalty_tier(), LoyaltyTier::Frequent);
        assert_eq!(client_with(11, 0.0).loyalty_tier(), LoyaltyTier::Vip);
    }

    #[test]
    fn test_spend_level_boundaries() {
        assert_eq!(client_with(1, 499.99).spend_level(), SpendLevel::New);
        assert_eq!(client_with(1, 500.0).spend_level(), SpendLevel::Low);
        assert_eq!(client_with(1, 2000.0).spend_level(), SpendLevel::Medium);
        assert_eq!(client_with(1, 5000.0).spend_level(), SpendLevel::High);
    }

    #[test]
    fn test_average_per_visit() {
        assert_eq!(client_with(0, 0.0).average_per_visit(), 0.0);
        assert_eq!(client_with(3, 1000.0).average_per_visit(), 333.33);
    }
}
