use shared::{CreateReferralRequest, Referral as SharedReferral, ReferralListResponse, UpdateReferralRequest};

use crate::domain::commands::referrals::{CreateReferralCommand, UpdateReferralCommand};
use crate::domain::models::referral::Referral as DomainReferral;

pub struct ReferralMapper;

impl ReferralMapper {
    pub fn to_dto(domain: DomainReferral) -> SharedReferral {
        SharedReferral {
            id: domain.id,
            referrer_id: domain.referrer_id,
            referrer_name: domain.referrer_name,
            referred_client_id: domain.referred_client_id,
            referred_name: domain.referred_name,
            prospect_email: domain.prospect_email,
            prospect_phone: domain.prospect_phone,
            status: domain.status,
            comments: domain.comments,
            created_at: domain.created_at,
        }
    }

    pub fn to_list_dto(referrals: Vec<DomainReferral>) -> ReferralListResponse {
        ReferralListResponse {
            referrals: referrals.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateReferralRequest) -> CreateReferralCommand {
        CreateReferralCommand {
            referrer_id: request.referrer_id,
            referred_client_id: request.referred_client_id,
            prospect_name: request.prospect_name,
            prospect_email: request.prospect_email,
            prospect_phone: request.prospect_phone,
            comments: request.comments,
        }
    }

    pub fn to_update_command(request: UpdateReferralRequest) -> UpdateReferralCommand {
        UpdateReferralCommand {
            status: request.status,
            prospect_email: request.prospect_email,
            prospect_phone: request.prospect_phone,
            comments: request.comments,
        }
    }
}
