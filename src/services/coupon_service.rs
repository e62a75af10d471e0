use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::coupons::{
    CouponList, CreateCouponRequest, UpdateCouponRequest, ValidateCouponRequest,
    ValidateCouponResponse,
};
use crate::{
    audit::log_audit,
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Look a code up and return the discount it grants for the given subtotal.
/// Shared by the public validate endpoint and checkout, which passes its
/// transaction so the coupon it applies is the one it read.
pub async fn resolve_discount<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    subtotal: i64,
) -> AppResult<i64> {
    let coupon = Coupons::find()
        .filter(Column::Code.eq(code))
        .one(conn)
        .await?;
    let coupon = match coupon {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Invalid coupon code".into())),
    };

    check_coupon(&coupon, subtotal, Utc::now())
}

fn check_coupon(coupon: &CouponModel, subtotal: i64, now: DateTime<Utc>) -> AppResult<i64> {
    if !coupon.active {
        return Err(AppError::BadRequest("Coupon is no longer active".into()));
    }
    if let Some(expires_at) = coupon.expires_at {
        if expires_at.with_timezone(&Utc) < now {
            return Err(AppError::BadRequest("Coupon has expired".into()));
        }
    }
    if subtotal < coupon.min_order {
        return Err(AppError::BadRequest(
            "Order subtotal is below the coupon minimum".into(),
        ));
    }
    Ok(coupon.discount)
}

pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<ValidateCouponResponse>> {
    let discount = resolve_discount(&state.orm, &payload.code, payload.subtotal).await?;
    let data = ValidateCouponResponse {
        code: payload.code,
        discount,
    };
    Ok(ApiResponse::success("Coupon valid", data, None))
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Coupons::find().order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(coupon_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(meta)))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;

    if payload.discount <= 0 {
        return Err(AppError::BadRequest("discount must be greater than 0".into()));
    }

    let exist = Coupons::find()
        .filter(Column::Code.eq(payload.code.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Coupon code is already taken".into()));
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        code: Set(payload.code),
        discount: Set(payload.discount),
        min_order: Set(payload.min_order),
        expires_at: Set(payload.expires_at.map(Into::into)),
        active: Set(true),
        created_at: NotSet,
    };
    let coupon = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Coupon created",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;

    let existing = Coupons::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(discount) = payload.discount {
        active.discount = Set(discount);
    }
    if let Some(min_order) = payload.min_order {
        active.min_order = Set(min_order);
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(Some(expires_at.into()));
    }
    if let Some(is_active) = payload.active {
        active.active = Set(is_active);
    }

    let coupon = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "coupon_update",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": coupon.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        coupon_from_entity(coupon),
        Some(Meta::empty()),
    ))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "coupon_delete",
        Some("coupons"),
        Some(serde_json::json!({ "coupon_id": id })),
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

fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        discount: model.discount,
        min_order: model.min_order,
        expires_at: model.expires_at.map(|dt| dt.with_timezone(&Utc)),
        active: model.active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
