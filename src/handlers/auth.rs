// Health and session status
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use super::helpers::{respond, ApiResult};
use super::state::AppState;
use crate::models::{HealthResponse, UserSession};
use crate::session::SessionManager;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: "Lenny storefront core is running".to_string(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub logged_in: bool,
    pub user: Option<UserSession>,
    pub login_timer: Option<String>,
    pub phone_number: Option<String>,
}

impl SessionStatus {
    fn of(session: &SessionManager) -> Self {
        Self {
            logged_in: session.is_logged_in(),
            user: session.current_session(),
            login_timer: session.login_timer(),
            phone_number: session.remembered_phone(),
        }
    }
}

/// `GET /auth/session`
pub async fn session_status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.peek_visitor(&req);
    let status = SessionStatus::of(&handle.visitor.session);
    respond(&state, &handle, Ok(status))
}

/// `POST /auth/logout`
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result: ApiResult<SessionStatus> = handle
        .visitor
        .session
        .clear_user_session()
        .map(|()| {
            log::info!("Visitor {} logged out", handle.visitor.id);
            SessionStatus::of(&handle.visitor.session)
        })
        .map_err(Into::into);
    respond(&state, &handle, result)
}
