// Response construction shared by every JSON handler
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

use super::state::{AppState, VisitorHandle};
use crate::booking::BookingError;
use crate::catalog::CatalogError;
use crate::login::LoginError;
use crate::session::SessionError;
use crate::validation::FieldErrors;

/// Every failure a handler can report
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Login(LoginError::Busy | LoginError::WrongState { .. })
            | Self::Booking(BookingError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            Self::Login(LoginError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Login(LoginError::Rejected(_))
            | Self::Booking(BookingError::UnknownSlot(_) | BookingError::NoProduct)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::UnknownProduct(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::Login(LoginError::Session(_)) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Login(LoginError::Busy) => "busy",
            Self::Login(LoginError::WrongState { .. }) => "wrong_state",
            Self::Login(LoginError::Validation(_)) => "validation_failed",
            Self::Login(LoginError::Rejected(_)) => "rejected",
            Self::Booking(BookingError::InvalidTransition { .. }) => "invalid_transition",
            Self::Booking(_) | Self::BadRequest(_) => "invalid_request",
            Self::Catalog(CatalogError::UnknownProduct(_)) => "not_found",
            Self::Catalog(_) => "bad_gateway",
            Self::Login(LoginError::Session(_)) | Self::Session(_) => "server_error",
        }
    }

    /// Text safe to show the visitor
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::Rejected { message, .. }) => message.clone(),
            Self::Catalog(CatalogError::UnknownProduct(_)) => self.to_string(),
            Self::Catalog(_) => "Failed to load products. Please try again.".to_string(),
            Self::Login(LoginError::Session(_)) | Self::Session(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Login(LoginError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_response(&self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::debug!("Request rejected ({status}): {self}");
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.public_message(),
        });
        if let Some(errors) = self.field_errors() {
            body["fieldErrors"] = json!(errors);
        }
        HttpResponse::build(status).json(body)
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Build the JSON response for `result` and attach the visitor's cookies
///
/// Queued session cookie writes are flushed on success and failure alike.
pub fn respond<T: Serialize>(
    state: &AppState,
    handle: &VisitorHandle,
    result: ApiResult<T>,
) -> HttpResponse {
    let mut response = match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => e.to_response(),
    };
    attach_cookies(state, handle, &mut response);
    response
}

fn attach_cookies(state: &AppState, handle: &VisitorHandle, response: &mut HttpResponse) {
    if handle.is_new {
        let cookie = state
            .cookie_factory
            .visitor_cookie(&handle.visitor.id.to_string());
        if let Err(e) = response.add_cookie(&cookie) {
            log::error!("Failed to set visitor cookie: {e}");
        }
    }
    for write in handle.visitor.session.take_cookie_writes() {
        let cookie = state.cookie_factory.build(&write);
        if let Err(e) = response.add_cookie(&cookie) {
            log::error!("Failed to set cookie {}: {e}", write.name);
        }
    }
}

/// `try_lock` a visitor mutex, rejecting a concurrent duplicate submission
///
/// # Errors
///
/// Returns `Busy` while another request holds the lock
pub fn try_lock<T>(mutex: &tokio::sync::Mutex<T>) -> ApiResult<tokio::sync::MutexGuard<'_, T>> {
    mutex.try_lock().map_err(|_| {
        log::warn!("Rejected a concurrent submission for the same visitor");
        ApiError::Login(LoginError::Busy)
    })
}
