use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::pets::PetList,
    error::AppResult,
    models::Pet,
    response::ApiResponse,
    routes::params::PetListQuery,
    services::pet_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets))
        .route("/{id}", get(get_pet))
}

#[utoipa::path(
    get,
    path = "/api/pets",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Keyword over name and description"),
        ("category" = Option<String>, Query, description = "Comma-joined category ids; detail selections take precedence over the parent id"),
        ("min_price" = Option<i64>, Query, description = "Minimum price"),
        ("max_price" = Option<i64>, Query, description = "Maximum price"),
        ("gender" = Option<String>, Query, description = "Filter by gender"),
        ("city" = Option<String>, Query, description = "Filter by city"),
        ("sort" = Option<String>, Query, description = "Sort: newest, oldest, price-asc, price-desc"),
    ),
    responses(
        (status = 200, description = "List pets", body = ApiResponse<PetList>)
    ),
    tag = "Pets"
)]
pub async fn list_pets(
    State(state): State<AppState>,
    Query(query): Query<PetListQuery>,
) -> AppResult<Json<ApiResponse<PetList>>> {
    let resp = pet_service::list_pets(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pets/{id}",
    params(
        ("id" = Uuid, Path, description = "Pet ID")
    ),
    responses(
        (status = 200, description = "Get pet", body = ApiResponse<Pet>),
        (status = 404, description = "Pet not found"),
    ),
    tag = "Pets"
)]
pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Pet>>> {
    let resp = pet_service::get_pet(&state, id).await?;
    Ok(Json(resp))
}
