use shared::WaiverSelection as SharedSelection;

use crate::domain::commands::waivers::WaiverSelection;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::validation::parse_date;

pub struct WaiverMapper;

impl WaiverMapper {
    pub fn to_selection(dto: SharedSelection) -> DomainResult<WaiverSelection> {
        match dto {
            SharedSelection::Event { event_id } => Ok(WaiverSelection::Event(event_id)),
            SharedSelection::DateRange { from, to } => {
                let from_date = parse_date(from.trim());
                let to_date = parse_date(to.trim());
                match (from_date, to_date) {
                    (Some(from), Some(to)) => Ok(WaiverSelection::DateRange { from, to }),
                    (None, _) => Err(DomainError::field("from", "Use the YYYY-MM-DD date format.")),
                    (_, None) => Err(DomainError::field("to", "Use the YYYY-MM-DD date format.")),
                }
            }
            SharedSelection::Clients { client_ids } => Ok(WaiverSelection::Clients(client_ids)),
            SharedSelection::All => Ok(WaiverSelection::AllActive),
        }
    }
}
