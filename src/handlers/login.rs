// Login modal endpoints
//
// Every route drives the modal owned by the visitor's booking wizard. A
// success while the wizard waits on login also completes the booking.
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::helpers::{respond, try_lock, ApiError};
use super::state::AppState;
use crate::booking::BookingView;
use crate::identity::{FacebookAuthResponse, ProviderGrant, ProviderKind};
use crate::login::{LoginChannel, LoginError, LoginOutcome, LoginView};
use crate::models::{BookingCompletion, LoginData, UserSession};
use crate::validation::EmailForm;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// `pending`, `success` or `newAccount`
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_data: Option<LoginData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_account: Option<NewAccount>,
    pub login: LoginView,
    pub booking: BookingView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<BookingCompletion>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub phone_number: String,
    pub details: Value,
}

/// Lock the wizard, run a modal operation and fold its outcome back in
macro_rules! drive_login {
    ($handle:expr, |$modal:ident| $operation:expr) => {{
        async {
            let mut flow = try_lock(&$handle.visitor.booking)?;
            let outcome = {
                let $modal = flow.login_mut();
                $operation
            };
            let outcome: LoginOutcome = outcome?;
            let completion = flow.on_login_outcome(&outcome)?;
            let login = flow.login().view();
            Ok::<_, ApiError>(LoginResponse::new(outcome, login, flow.view(), completion))
        }
        .await
    }};
}

impl LoginResponse {
    fn new(
        outcome: LoginOutcome,
        login: LoginView,
        booking: BookingView,
        completion: Option<BookingCompletion>,
    ) -> Self {
        let (outcome, login_data, new_account) = match outcome {
            LoginOutcome::Pending => ("pending", None, None),
            LoginOutcome::Success(data) => ("success", Some(data), None),
            LoginOutcome::NewAccount {
                phone_number,
                details,
            } => (
                "newAccount",
                None,
                Some(NewAccount {
                    phone_number,
                    details,
                }),
            ),
        };
        Self {
            outcome,
            login_data,
            new_account,
            login,
            booking,
            completion,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MethodRequest {
    pub method: LoginChannel,
}

/// `POST /login/method`
pub async fn select_method(
    req: HttpRequest,
    body: web::Json<MethodRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| {
        modal.select_channel(body.method);
        Ok::<_, LoginError>(LoginOutcome::Pending)
    });
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

/// `POST /login/mobile`
pub async fn submit_phone(
    req: HttpRequest,
    body: web::Json<PhoneRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| modal.submit_phone(&body.phone).await);
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
pub struct DigitRequest {
    pub index: usize,
    #[serde(default)]
    pub value: String,
}

/// `POST /login/otp/digit`; a fourth digit triggers verification
pub async fn otp_digit(
    req: HttpRequest,
    body: web::Json<DigitRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| modal
        .input_otp_digit(body.index, &body.value)
        .await);
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
pub struct BackspaceRequest {
    pub index: usize,
}

/// `POST /login/otp/backspace`
pub async fn otp_backspace(
    req: HttpRequest,
    body: web::Json<BackspaceRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| modal.otp_backspace(body.index));
    respond(&state, &handle, result)
}

/// `POST /login/otp/verify`
pub async fn verify_otp(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| modal.verify_otp().await);
    respond(&state, &handle, result)
}

/// `POST /login/otp/resend`
pub async fn resend_otp(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| modal.resend_otp().await);
    respond(&state, &handle, result)
}

/// `POST /login/email`
pub async fn submit_email(
    req: HttpRequest,
    body: web::Json<EmailForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let form = body.into_inner();
    let result = drive_login!(handle, |modal| modal.submit_email(form).await);
    respond(&state, &handle, result)
}

/// `POST /login/email/toggle`
pub async fn toggle_email_mode(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive_login!(handle, |modal| {
        modal.toggle_email_mode();
        Ok::<_, LoginError>(LoginOutcome::Pending)
    });
    respond(&state, &handle, result)
}

/// Vendor callback payload relayed by the page
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SocialGrantRequest {
    /// Google ID token
    pub credential: Option<String>,
    #[serde(rename = "authResponse")]
    pub auth_response: Option<FacebookAuthResponse>,
    /// Vendor error text such as `popup_blocked`
    pub error: Option<String>,
}

impl SocialGrantRequest {
    fn into_grant(self, provider: ProviderKind) -> Result<ProviderGrant, ApiError> {
        if let Some(error) = self.error {
            return Ok(ProviderGrant::Failed { error });
        }
        match provider {
            ProviderKind::Google => self
                .credential
                .map(|credential| ProviderGrant::Google { credential })
                .ok_or_else(|| ApiError::BadRequest("Missing Google credential".to_string())),
            ProviderKind::Facebook => Ok(ProviderGrant::Facebook {
                auth_response: self.auth_response,
            }),
        }
    }
}

/// `POST /login/social/{provider}`
pub async fn social_login(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SocialGrantRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let grant = path
        .parse::<ProviderKind>()
        .map_err(ApiError::BadRequest)
        .and_then(|provider| Ok((provider, body.into_inner().into_grant(provider)?)));

    let result = match grant {
        Ok((provider, grant)) => {
            drive_login!(handle, |modal| modal.social_login(provider, grant).await)
        }
        Err(e) => Err(e),
    };
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
pub struct AccountCreatedRequest {
    pub user: UserSession,
}

/// `POST /login/account-created`, reported by the account-creation page
pub async fn account_created(
    req: HttpRequest,
    body: web::Json<AccountCreatedRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let user = body.into_inner().user;
    let result = drive_login!(handle, |modal| modal.account_created(user));
    respond(&state, &handle, result)
}
