use std::sync::Arc;
use tracing::{info, warn};

use super::commands::referrals::{CreateReferralCommand, UpdateReferralCommand};
use super::error::{DomainError, DomainResult};
use super::models::now_timestamp;
use super::models::referral::{NewReferral, Referral};
use super::validation::{normalize_optional, Validator};
use crate::storage::ReferralStorage;

/// Service for tracking who introduced whom
#[derive(Clone)]
pub struct ReferralService {
    referrals: Arc<dyn ReferralStorage>,
}

impl ReferralService {
    pub fn new(referrals: Arc<dyn ReferralStorage>) -> Self {
        Self { referrals }
    }

    pub async fn list(&self) -> DomainResult<Vec<Referral>> {
        let referrals = self.referrals.list_referrals().await?;
        info!("Found {} referrals", referrals.len());
        Ok(referrals)
    }

    pub async fn get(&self, id: i64) -> DomainResult<Option<Referral>> {
        let referral = self.referrals.get_referral(id).await?;
        if referral.is_none() {
            warn!("Referral not found: {}", id);
        }
        Ok(referral)
    }

    pub async fn search(&self, query: &str) -> DomainResult<Vec<Referral>> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        Ok(self.referrals.search_referrals(query).await?)
    }

    pub async fn list_by_referrer(&self, client_id: i64) -> DomainResult<Vec<Referral>> {
        Ok(self.referrals.list_referrals_by_referrer(client_id).await?)
    }

    pub async fn create(&self, command: CreateReferralCommand) -> DomainResult<Referral> {
        let prospect_name = normalize_optional(command.prospect_name);
        let prospect_email = normalize_optional(command.prospect_email);
        let prospect_phone = normalize_optional(command.prospect_phone);

        let mut v = Validator::new();
        v.required_id("referrer_id", "referring client", command.referrer_id);
        if command.referred_client_id.is_none() && prospect_name.is_none() {
            v.push("prospect_name", "Select a referred client or enter the prospect's name.");
        }
        if let Some(name) = prospect_name.as_deref() {
            v.text("prospect_name", "Prospect name", name, 2, 100);
        }
        if command.referrer_id.is_some() && command.referrer_id == command.referred_client_id {
            v.push("referred_client_id", "A client cannot refer themselves.");
        }
        v.phone("prospect_phone", prospect_phone.as_deref());
        v.email("prospect_email", prospect_email.as_deref());
        v.finish()?;

        let referrer_id = command
            .referrer_id
            .ok_or_else(|| DomainError::field("referrer_id", "Select a referring client."))?;

        let new_referral = NewReferral {
            referrer_id,
            referred_client_id: command.referred_client_id,
            prospect_name,
            prospect_email,
            prospect_phone,
            comments: normalize_optional(command.comments),
            created_at: now_timestamp(),
        };

        let referral = self.referrals.insert_referral(&new_referral).await?;
        info!("Recorded referral {} by client {}", referral.id, referral.referrer_id);
        Ok(referral)
    }

    /// Status, contact details and comments are the only mutable fields
    pub async fn update(&self, id: i64, command: UpdateReferralCommand) -> DomainResult<Referral> {
        let mut referral = self
            .referrals
            .get_referral(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Referral", id))?;

        if let Some(status) = command.status {
            referral.status = status;
        }
        if command.prospect_email.is_some() {
            referral.prospect_email = normalize_optional(command.prospect_email);
        }
        if command.prospect_phone.is_some() {
            referral.prospect_phone = normalize_optional(command.prospect_phone);
        }
        if command.comments.is_some() {
            referral.comments = normalize_optional(command.comments);
        }

        let mut v = Validator::new();
        v.phone("prospect_phone", referral.prospect_phone.as_deref());
        v.email("prospect_email", referral.prospect_email.as_deref());
        v.finish()?;

        self.referrals.update_referral(&referral).await?;
        info!("Updated referral {} to {}", referral.id, referral.status.as_str());
        Ok(referral)
    }
}
