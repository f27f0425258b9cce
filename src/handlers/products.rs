// Product listing endpoints
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use super::helpers::{respond, ApiError, ApiResult};
use super::state::AppState;
use crate::catalog::{debounced_price_change, FilterUpdate, ListingView, SortKey};

/// `GET /products`, fetching first when filters are given in the query
pub async fn list_products(
    req: HttpRequest,
    query: web::Query<FilterUpdate>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let update = query.into_inner();
    let handle = if update.is_empty() {
        state.peek_visitor(&req)
    } else {
        state.visitor(&req)
    };
    let result: ApiResult<ListingView> = async {
        let mut listing = handle.visitor.listing.lock().await;
        if !update.is_empty() {
            listing.apply_filters(state.backend.as_ref(), update).await?;
        }
        Ok::<_, ApiError>(listing.view())
    }
    .await;
    respond(&state, &handle, result)
}

/// `POST /products/filters`
pub async fn update_filters(
    req: HttpRequest,
    body: web::Json<FilterUpdate>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let result: ApiResult<ListingView> = async {
        let mut listing = handle.visitor.listing.lock().await;
        listing
            .apply_filters(state.backend.as_ref(), body.into_inner())
            .await?;
        Ok::<_, ApiError>(listing.view())
    }
    .await;
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeRequest {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeResponse {
    /// `false` when a later change in the same burst took over
    pub fetched: bool,
    pub listing: ListingView,
}

/// `POST /products/price-range`, debounced
pub async fn update_price_range(
    req: HttpRequest,
    body: web::Json<PriceRangeRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let visitor = &handle.visitor;
    let result: ApiResult<PriceRangeResponse> = async {
        let fetched = debounced_price_change(
            &visitor.listing,
            &visitor.price_debounce,
            state.backend.as_ref(),
            body.min_price,
            body.max_price,
        )
        .await?;
        Ok::<_, ApiError>(PriceRangeResponse {
            fetched,
            listing: visitor.listing.lock().await.view(),
        })
    }
    .await;
    respond(&state, &handle, result)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    pub sort_by: SortKey,
}

/// `POST /products/sort`, never fetches
pub async fn update_sort(
    req: HttpRequest,
    body: web::Json<SortRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let handle = state.visitor(&req);
    let mut listing = handle.visitor.listing.lock().await;
    listing.set_sort(body.sort_by);
    let view = listing.view();
    drop(listing);
    respond(&state, &handle, Ok(view))
}
