use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::pets::{CreatePetRequest, PetList, UpdatePetRequest};
use crate::{
    audit::log_audit,
    entity::categories::Entity as Categories,
    entity::pets::{ActiveModel, Column, Entity as Pets, Model as PetModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::Pet,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, PetListQuery, PetSort},
    state::AppState,
};

pub async fn list_pets(state: &AppState, query: PetListQuery) -> AppResult<ApiResponse<PetList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    // The storefront sends either the selected detail categories comma-joined
    // or the single parent/root id; both arrive through the same parameter.
    let category_ids = query.category_ids();
    if !category_ids.is_empty() {
        condition = condition.add(Column::CategoryId.is_in(category_ids));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(gender) = query.gender.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Gender.eq(gender.clone()));
    }

    if let Some(city) = query.city.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::City.eq(city.clone()));
    }

    let sort = query.sort.unwrap_or(PetSort::Newest);

    let mut finder = Pets::find().filter(condition);
    finder = match sort {
        PetSort::Newest => finder.order_by_desc(Column::CreatedAt),
        PetSort::Oldest => finder.order_by_asc(Column::CreatedAt),
        PetSort::PriceAsc => finder.order_by_asc(Column::Price),
        PetSort::PriceDesc => finder.order_by_desc(Column::Price),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(pet_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = PetList { items };
    Ok(ApiResponse::success("Pets", data, Some(meta)))
}

pub async fn get_pet(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Pet>> {
    let result = Pets::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(pet_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Pet", result, None))
}

pub async fn list_seller_pets(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PetList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Pets::find()
        .filter(Column::SellerId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(pet_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Pets", PetList { items }, Some(meta)))
}

pub async fn create_pet(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePetRequest,
) -> AppResult<ApiResponse<Pet>> {
    ensure_seller(user)?;

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        seller_id: Set(user.user_id),
        category_id: Set(payload.category_id),
        name: Set(payload.name),
        description: Set(Some(payload.description)),
        price: Set(payload.price),
        stock: Set(payload.stock),
        gender: Set(payload.gender),
        city: Set(payload.city),
        images: Set(serde_json::json!(payload.images)),
        created_at: NotSet,
    };
    let pet = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "pet_create",
        Some("pets"),
        Some(serde_json::json!({ "pet_id": pet.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Pet created",
        pet_from_entity(pet),
        Some(Meta::empty()),
    ))
}

pub async fn update_pet(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePetRequest,
) -> AppResult<ApiResponse<Pet>> {
    ensure_seller(user)?;
    let existing = Pets::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if existing.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(gender) = payload.gender {
        active.gender = Set(Some(gender));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(images) = payload.images {
        active.images = Set(serde_json::json!(images));
    }

    let pet = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "pet_update",
        Some("pets"),
        Some(serde_json::json!({ "pet_id": pet.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        pet_from_entity(pet),
        Some(Meta::empty()),
    ))
}

pub async fn delete_pet(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_seller(user)?;
    let existing = Pets::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if existing.seller_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    Pets::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "pet_delete",
        Some("pets"),
        Some(serde_json::json!({ "pet_id": id })),
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

pub(crate) fn pet_from_entity(model: PetModel) -> Pet {
    Pet {
        id: model.id,
        seller_id: model.seller_id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        gender: model.gender,
        city: model.city,
        images: model.images,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
