// Booking wizard endpoints
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::helpers::{respond, try_lock, ApiError, ApiResult};
use super::state::{AppState, VisitorHandle};
use crate::booking::{BookingError, BookingFlow, BookingView};
use crate::catalog::CatalogError;
use crate::models::{BookingCompletion, Product, SelectedItem, TimeSlot};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking: BookingView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<BookingCompletion>,
}

impl BookingResponse {
    pub(crate) fn new(flow: &BookingFlow, completion: Option<BookingCompletion>) -> Self {
        Self {
            booking: flow.view(),
            completion,
        }
    }
}

/// Run `operation` on the visitor's wizard under the double-submit guard
fn drive<F>(handle: &VisitorHandle, operation: F) -> ApiResult<BookingResponse>
where
    F: FnOnce(&mut BookingFlow) -> Result<Option<BookingCompletion>, BookingError>,
{
    let mut flow = try_lock(&handle.visitor.booking)?;
    let completion = operation(&mut flow)?;
    Ok(BookingResponse::new(&flow, completion))
}

/// `GET /booking`
pub async fn booking_state(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.peek_visitor(&req);
    let result = drive(&handle, |_| Ok(None));
    respond(&state, &handle, result)
}

/// `GET /booking/time-slots`
pub async fn time_slots() -> HttpResponse {
    HttpResponse::Ok().json(TimeSlot::catalog())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    /// A product from the visitor's current listing
    pub product_id: Option<String>,
    /// Or the product itself, e.g. from a detail page
    pub product: Option<Product>,
}

/// `POST /booking/open`
pub async fn open_booking(
    req: HttpRequest,
    body: web::Json<OpenRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let OpenRequest {
        product_id,
        product,
    } = body.into_inner();

    let product = match (product, product_id) {
        (Some(product), _) => Ok(product),
        (None, Some(id)) => handle
            .visitor
            .listing
            .lock()
            .await
            .select_product(&id)
            .cloned()
            .ok_or(ApiError::Catalog(CatalogError::UnknownProduct(id))),
        (None, None) => Err(ApiError::Booking(BookingError::NoProduct)),
    };

    let result = product.and_then(|product| {
        drive(&handle, |flow| {
            flow.open(product);
            Ok(None)
        })
    });
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
}

/// `POST /booking/date`
pub async fn select_date(
    req: HttpRequest,
    body: web::Json<DateRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive(&handle, |flow| flow.select_date(body.date).map(|()| None));
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRequest {
    pub slot_id: u32,
}

/// `POST /booking/time`; an unavailable slot leaves the wizard where it is
pub async fn select_time(
    req: HttpRequest,
    body: web::Json<TimeRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive(&handle, |flow| {
        let slot = TimeSlot::find(body.slot_id).ok_or(BookingError::UnknownSlot(body.slot_id))?;
        flow.select_time_slot(slot).map(|_| None)
    });
    respond(&state, &handle, result)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomizationsRequest {
    pub customizations: Vec<SelectedItem>,
    pub recommended: Vec<SelectedItem>,
}

/// `POST /booking/customizations`; completes at once for a signed-in visitor
pub async fn confirm_customizations(
    req: HttpRequest,
    body: web::Json<CustomizationsRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let CustomizationsRequest {
        customizations,
        recommended,
    } = body.into_inner();
    let result = drive(&handle, |flow| {
        flow.confirm_customizations(customizations, recommended)
    });
    respond(&state, &handle, result)
}

/// `POST /booking/back`
pub async fn back(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive(&handle, |flow| flow.back().map(|()| None));
    respond(&state, &handle, result)
}

/// `POST /booking/close`
pub async fn close(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let handle = state.visitor(&req);
    let result = drive(&handle, |flow| {
        flow.close();
        Ok(None)
    });
    respond(&state, &handle, result)
}

/// `POST /booking/edit/{step}` with `date`, `time` or `customizations`
pub async fn edit_step(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let step = path.into_inner();
    let result = match step.as_str() {
        "date" => drive(&handle, |flow| flow.edit_date().map(|()| None)),
        "time" => drive(&handle, |flow| flow.edit_time().map(|()| None)),
        "customizations" => drive(&handle, |flow| flow.edit_customizations().map(|()| None)),
        other => Err(ApiError::BadRequest(format!("Unknown booking step: {other}"))),
    };
    respond(&state, &handle, result)
}
