use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::categories::{CategoryList, CategoryTree},
    error::AppResult,
    response::ApiResponse,
    routes::params::CategoryListQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/tree", get(category_tree))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("parent" = Option<uuid::Uuid>, Query, description = "Narrow to direct children of this category")
    ),
    responses(
        (status = 200, description = "Flat category list", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, query.parent).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/tree",
    responses(
        (status = 200, description = "Depth-annotated pre-order category forest", body = ApiResponse<CategoryTree>)
    ),
    tag = "Categories"
)]
pub async fn category_tree(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryTree>>> {
    let resp = category_service::category_tree(&state).await?;
    Ok(Json(resp))
}
