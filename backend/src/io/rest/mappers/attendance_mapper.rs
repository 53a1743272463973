use shared::{Attendance as SharedAttendance, AttendanceListResponse, AttendanceQuery, WalkInRequest};

use super::optional_date;
use crate::domain::commands::attendance::WalkInCommand;
use crate::domain::error::DomainResult;
use crate::domain::filters::AttendanceFilter;
use crate::domain::models::attendance::Attendance as DomainAttendance;

pub struct AttendanceMapper;

impl AttendanceMapper {
    pub fn to_dto(domain: DomainAttendance) -> SharedAttendance {
        SharedAttendance {
            origin: domain.origin(),
            id: domain.id,
            client_id: domain.client_id,
            client_name: domain.client_name,
            event_id: domain.event_id,
            event_name: domain.event_name,
            amount_paid: domain.amount_paid,
            reservation_id: domain.reservation_id,
            deposit_amount: domain.deposit_amount,
            remaining_amount: domain.remaining_amount,
            created_at: domain.created_at,
        }
    }

    pub fn to_list_dto(attendances: Vec<DomainAttendance>) -> AttendanceListResponse {
        AttendanceListResponse {
            attendances: attendances.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_walk_in_command(request: WalkInRequest) -> WalkInCommand {
        WalkInCommand {
            client_id: request.client_id,
            event_id: request.event_id,
            amount: request.amount,
        }
    }

    pub fn to_filter(query: AttendanceQuery) -> DomainResult<AttendanceFilter> {
        Ok(AttendanceFilter {
            from: optional_date("from", query.from.as_deref())?,
            to: optional_date("to", query.to.as_deref())?,
            search: query.q,
            min_amount: query.min_amount,
            max_amount: query.max_amount,
        })
    }
}
