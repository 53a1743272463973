use shared::DashboardStats;

use super::event_mapper::EventMapper;
use crate::domain::stats_service::Dashboard;

pub struct StatsMapper;

impl StatsMapper {
    pub fn to_dto(dashboard: Dashboard) -> DashboardStats {
        DashboardStats {
            total_clients: dashboard.total_clients,
            total_events: dashboard.total_events,
            total_referrals: dashboard.total_referrals,
            total_attendances: dashboard.total_attendances,
            total_revenue: dashboard.total_revenue,
            active_clients: dashboard.active_clients,
            upcoming_event: dashboard.upcoming_event.map(EventMapper::to_dto),
            recent_events: dashboard.recent_events.into_iter().map(EventMapper::to_dto).collect(),
        }
    }
}
