use shared::{
    ConfirmReservationRequest, CreateReservationRequest, Reservation as SharedReservation, ReservationListResponse,
};

use crate::domain::commands::reservations::CreateReservationCommand;
use crate::domain::models::reservation::Reservation as DomainReservation;
use crate::domain::{DomainError, DomainResult};

pub struct ReservationMapper;

impl ReservationMapper {
    pub fn to_dto(domain: DomainReservation) -> SharedReservation {
        SharedReservation {
            outstanding: domain.outstanding(),
            id: domain.id,
            client_id: domain.client_id,
            client_name: domain.client_name,
            event_id: domain.event_id,
            event_name: domain.event_name,
            deposit: domain.deposit,
            expected_total: domain.expected_total,
            state: domain.state,
            comments: domain.comments,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_list_dto(reservations: Vec<DomainReservation>) -> ReservationListResponse {
        ReservationListResponse {
            reservations: reservations.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateReservationRequest) -> CreateReservationCommand {
        CreateReservationCommand {
            client_id: request.client_id,
            event_id: request.event_id,
            deposit: request.deposit,
            expected_total: request.expected_total,
            comments: request.comments,
        }
    }

    /// Remaining amount from a confirm body. Only a blank body means
    /// "settle the balance"; anything unreadable is rejected.
    pub fn to_confirm_remaining(body: &[u8]) -> DomainResult<Option<f64>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<ConfirmReservationRequest>(body) {
            Ok(request) => Ok(request.remaining_amount),
            Err(err) if err.is_data() => {
                Err(DomainError::field("remaining_amount", "The remaining amount must be a number."))
            }
            Err(_) => Err(DomainError::field("body", "The request body is not valid JSON.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_body_parsing() {
        assert_eq!(ReservationMapper::to_confirm_remaining(b"").unwrap(), None);
        assert_eq!(ReservationMapper::to_confirm_remaining(b" \n").unwrap(), None);
        assert_eq!(ReservationMapper::to_confirm_remaining(b"{}").unwrap(), None);
        assert_eq!(
            ReservationMapper::to_confirm_remaining(br#"{"remaining_amount": 50}"#).unwrap(),
            Some(50.0)
        );

        let unreadable: [&[u8]; 3] = [br#"{"remaining_amount": "50"}"#, b"{remaining", b"null"];
        for body in unreadable {
            match ReservationMapper::to_confirm_remaining(body) {
                Err(DomainError::Validation(_)) => {}
                other => panic!("unexpected result for {:?}: {:?}", String::from_utf8_lossy(body), other),
            }
        }
    }
}
