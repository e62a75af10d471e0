use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::coupons::{ValidateCouponRequest, ValidateCouponResponse},
    error::AppResult,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Discount granted by the code for this subtotal", body = ApiResponse<ValidateCouponResponse>),
        (status = 400, description = "Unknown, inactive, expired or below-minimum coupon"),
    ),
    tag = "Coupons"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCouponRequest>,
) -> AppResult<Json<ApiResponse<ValidateCouponResponse>>> {
    let resp = coupon_service::validate_coupon(&state, payload).await?;
    Ok(Json(resp))
}
