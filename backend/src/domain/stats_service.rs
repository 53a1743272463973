use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use super::error::DomainResult;
use super::event_service::RECENT_EVENTS_LIMIT;
use super::models::event::Event;
use super::models::round_cents;
use crate::storage::{AttendanceStorage, ClientStorage, EventStorage, ReferralStorage};

/// Figures shown on the home dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub total_clients: i64,
    pub total_events: i64,
    pub total_referrals: i64,
    pub total_attendances: i64,
    pub total_revenue: f64,
    pub active_clients: i64,
    pub upcoming_event: Option<Event>,
    pub recent_events: Vec<Event>,
}

#[derive(Clone)]
pub struct StatsService {
    clients: Arc<dyn ClientStorage>,
    events: Arc<dyn EventStorage>,
    referrals: Arc<dyn ReferralStorage>,
    attendances: Arc<dyn AttendanceStorage>,
}

impl StatsService {
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        events: Arc<dyn EventStorage>,
        referrals: Arc<dyn ReferralStorage>,
        attendances: Arc<dyn AttendanceStorage>,
    ) -> Self {
        Self { clients, events, referrals, attendances }
    }

    pub async fn dashboard(&self) -> DomainResult<Dashboard> {
        self.dashboard_on(Local::now().date_naive()).await
    }

    pub async fn dashboard_on(&self, today: NaiveDate) -> DomainResult<Dashboard> {
        let dashboard = Dashboard {
            total_clients: self.clients.count_clients().await?,
            total_events: self.events.count_events().await?,
            total_referrals: self.referrals.count_referrals().await?,
            total_attendances: self.attendances.count_attendances().await?,
            total_revenue: round_cents(self.attendances.total_revenue().await?),
            active_clients: self.clients.count_clients_with_visits().await?,
            upcoming_event: self.events.next_event_from(today).await?,
            recent_events: self.events.finished_before(today, RECENT_EVENTS_LIMIT).await?,
        };

        info!(
            "Dashboard: {} clients, {} events, revenue {:.2}",
            dashboard.total_clients, dashboard.total_events, dashboard.total_revenue
        );
        Ok(dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::attendance::WalkInCommand;
    use crate::domain::commands::events::CreateEventCommand;
    use crate::domain::commands::referrals::CreateReferralCommand;
    use crate::test_support::TestContext;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let ctx = TestContext::new().await;
        let dashboard = ctx.stats.dashboard().await.unwrap();

        assert_eq!(dashboard.total_clients, 0);
        assert_eq!(dashboard.total_revenue, 0.0);
        assert!(dashboard.upcoming_event.is_none());
        assert!(dashboard.recent_events.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_totals() {
        let ctx = TestContext::new().await;
        let ana = ctx.client("Ana", "López").await;
        ctx.client("Bruno", "Díaz").await;

        let past = ctx
            .events
            .create(CreateEventCommand {
                name: "Luna de enero".to_string(),
                location: "Tepoztlán".to_string(),
                scheduled_date: Some("2024-01-20".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        ctx.events
            .create(CreateEventCommand {
                name: "Equinoccio".to_string(),
                location: "Tepoztlán".to_string(),
                scheduled_date: Some("2024-03-20".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        ctx.attendances
            .record_walk_in(WalkInCommand { client_id: Some(ana.id), event_id: Some(past.id), amount: Some(300.25) })
            .await
            .unwrap();
        ctx.referrals
            .create(CreateReferralCommand {
                referrer_id: Some(ana.id),
                prospect_name: Some("Carmen Ruiz".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let dashboard = ctx.stats.dashboard_on(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).await.unwrap();
        assert_eq!(dashboard.total_clients, 2);
        assert_eq!(dashboard.total_events, 2);
        assert_eq!(dashboard.total_referrals, 1);
        assert_eq!(dashboard.total_attendances, 1);
        assert_eq!(dashboard.total_revenue, 300.25);
        assert_eq!(dashboard.active_clients, 1);
        assert_eq!(dashboard.upcoming_event.map(|e| e.name), Some("Equinoccio".to_string()));
        assert_eq!(dashboard.recent_events.len(), 1);
    }
}
