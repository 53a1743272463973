use shared::{SessionResponse, SignUpRequest, User as SharedUser};

use crate::domain::commands::auth::SignUpCommand;
use crate::domain::models::user::{Session, User as DomainUser};

pub struct AuthMapper;

impl AuthMapper {
    /// Public view of an account. The password hash never leaves the domain.
    pub fn to_user_dto(domain: DomainUser) -> SharedUser {
        SharedUser {
            id: domain.id,
            email: domain.email,
            display_name: domain.display_name,
            created_at: domain.created_at,
        }
    }

    pub fn to_session_dto(user: DomainUser, session: Session) -> SessionResponse {
        SessionResponse {
            token: session.token,
            user: Self::to_user_dto(user),
            expires_at: session.expires_at,
        }
    }

    pub fn to_sign_up_command(request: SignUpRequest) -> SignUpCommand {
        SignUpCommand {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
        }
    }
}
