use std::collections::HashSet;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    category_tree::{self, CategoryRecord},
    dto::categories::{CategoryList, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Flat category list, optionally narrowed to the direct children of one
/// parent. The partition is recomputed from the full fetch on every call.
pub async fn list_categories(
    state: &AppState,
    parent: Option<Uuid>,
) -> AppResult<ApiResponse<CategoryList>> {
    let mut items: Vec<Category> = Categories::find()
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    if let Some(parent) = parent {
        let records: Vec<CategoryRecord> =
            items.iter().cloned().map(CategoryRecord::from).collect();
        let keep: HashSet<Uuid> = category_tree::children_of(&records, parent)
            .into_iter()
            .map(|c| c.id)
            .collect();
        items.retain(|c| keep.contains(&c.id));
    }

    let data = CategoryList { items };
    Ok(ApiResponse::success("Categories", data, None))
}

/// The whole forest flattened in pre-order with depth annotations, the shape
/// the admin tree table renders with indentation.
pub async fn category_tree(state: &AppState) -> AppResult<ApiResponse<CategoryTree>> {
    let records: Vec<CategoryRecord> = Categories::find()
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .map(CategoryRecord::from)
        .collect();

    let items = category_tree::flatten(&records);
    Ok(ApiResponse::success("Category tree", CategoryTree { items }, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    if let Some(parent_id) = payload.parent_id {
        let parent = Categories::find_by_id(parent_id).one(&state.orm).await?;
        if parent.is_none() {
            return Err(AppError::BadRequest("Parent category not found".into()));
        }
    }

    let exist = Categories::find()
        .filter(Column::Slug.eq(payload.slug.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Slug is already taken".into()));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        slug: Set(payload.slug),
        parent_id: Set(payload.parent_id),
        created_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    if let Some(parent_id) = payload.parent_id {
        if parent_id == id {
            return Err(AppError::BadRequest(
                "Category cannot be its own parent".into(),
            ));
        }
        let parent = Categories::find_by_id(parent_id).one(&state.orm).await?;
        if parent.is_none() {
            return Err(AppError::BadRequest("Parent category not found".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if payload.detach_parent {
        active.parent_id = Set(None);
    } else if let Some(parent_id) = payload.parent_id {
        active.parent_id = Set(Some(parent_id));
    }

    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        parent_id: model.parent_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
