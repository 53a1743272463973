//! CSV exports of clients, events and attendance.
//!
//! Money columns are written with two decimals. Quoting is left to the
//! `csv` writer, which only quotes fields containing delimiters, quotes or
//! newlines and doubles embedded quotes.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use super::commands::exports::Download;
use super::error::DomainResult;
use crate::storage::{AttendanceStorage, ClientStorage, EventStorage};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const CLIENT_HEADERS: [&str; 9] = [
    "id",
    "first_name",
    "last_name",
    "phone",
    "email",
    "visits",
    "accumulated_amount",
    "comments",
    "created_at",
];

const EVENT_HEADERS: [&str; 9] = [
    "id",
    "name",
    "location",
    "scheduled_date",
    "expense",
    "total_collected",
    "attendee_count",
    "status",
    "created_at",
];

const ATTENDANCE_HEADERS: [&str; 10] = [
    "id",
    "client_id",
    "client_name",
    "event_id",
    "event_name",
    "amount_paid",
    "deposit_amount",
    "remaining_amount",
    "origin",
    "created_at",
];

#[derive(Clone)]
pub struct ExportService {
    clients: Arc<dyn ClientStorage>,
    events: Arc<dyn EventStorage>,
    attendances: Arc<dyn AttendanceStorage>,
}

impl ExportService {
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        events: Arc<dyn EventStorage>,
        attendances: Arc<dyn AttendanceStorage>,
    ) -> Self {
        Self { clients, events, attendances }
    }

    pub async fn export_clients(&self) -> DomainResult<Download> {
        self.export_clients_on(Local::now().date_naive()).await
    }

    pub async fn export_clients_on(&self, today: NaiveDate) -> DomainResult<Download> {
        info!("📄 EXPORT: Exporting clients as CSV");
        let clients = self.clients.list_clients().await?;

        let rows = clients.iter().map(|c| {
            vec![
                c.id.to_string(),
                c.first_name.clone(),
                c.last_name.clone(),
                c.phone.clone().unwrap_or_default(),
                c.email.clone().unwrap_or_default(),
                c.visits.to_string(),
                money(c.accumulated_amount),
                c.comments.clone().unwrap_or_default(),
                c.created_at.clone(),
            ]
        });

        let download = csv_download("clients", today, &CLIENT_HEADERS, rows)?;
        info!("✅ EXPORT: {} clients written to {}", clients.len(), download.filename);
        Ok(download)
    }

    pub async fn export_events(&self) -> DomainResult<Download> {
        self.export_events_on(Local::now().date_naive()).await
    }

    pub async fn export_events_on(&self, today: NaiveDate) -> DomainResult<Download> {
        info!("📄 EXPORT: Exporting events as CSV");
        let events = self.events.list_events().await?;

        let rows = events.iter().map(|e| {
            vec![
                e.id.to_string(),
                e.name.clone(),
                e.location.clone(),
                e.scheduled_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                money(e.expense),
                money(e.total_collected),
                e.attendee_count.to_string(),
                e.status.as_str().to_string(),
                e.created_at.clone(),
            ]
        });

        let download = csv_download("events", today, &EVENT_HEADERS, rows)?;
        info!("✅ EXPORT: {} events written to {}", events.len(), download.filename);
        Ok(download)
    }

    pub async fn export_attendances(&self) -> DomainResult<Download> {
        self.export_attendances_on(Local::now().date_naive()).await
    }

    pub async fn export_attendances_on(&self, today: NaiveDate) -> DomainResult<Download> {
        info!("📄 EXPORT: Exporting attendance as CSV");
        let attendances = self.attendances.list_attendances().await?;

        let rows = attendances.iter().map(|a| {
            vec![
                a.id.to_string(),
                a.client_id.to_string(),
                a.client_name.clone(),
                a.event_id.to_string(),
                a.event_name.clone(),
                money(a.amount_paid),
                money(a.deposit_amount),
                money(a.remaining_amount),
                a.origin().as_str().to_string(),
                a.created_at.clone(),
            ]
        });

        let download = csv_download("attendances", today, &ATTENDANCE_HEADERS, rows)?;
        info!("✅ EXPORT: {} attendance records written to {}", attendances.len(), download.filename);
        Ok(download)
    }
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn csv_download<I>(prefix: &str, today: NaiveDate, headers: &[&str], rows: I) -> DomainResult<Download>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).context("failed to write CSV header")?;
    for row in rows {
        writer.write_record(&row).context("failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))?;

    Ok(Download {
        filename: format!("{}_{}.csv", prefix, today.format("%Y-%m-%d")),
        content_type: CSV_CONTENT_TYPE,
        bytes,
    })
}
