use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::Order,
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service,
    state::AppState,
};

/// Orders that contain at least one of the seller's items.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_seller(user)?;
    let (page, limit, offset) = query.pagination.normalize();
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let status = query.status.as_ref().filter(|s| !s.is_empty()).cloned();

    let sql = format!(
        r#"
        SELECT o.*
        FROM orders o
        WHERE EXISTS (
            SELECT 1 FROM order_items oi
            WHERE oi.order_id = o.id AND oi.seller_id = $1
        )
          AND ($2::TEXT IS NULL OR o.status = $2)
        ORDER BY o.created_at {}
        LIMIT $3 OFFSET $4
        "#,
        sort_order.as_sql()
    );

    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(user.user_id)
        .bind(status.clone())
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM orders o
        WHERE EXISTS (
            SELECT 1 FROM order_items oi
            WHERE oi.order_id = o.id AND oi.seller_id = $1
        )
          AND ($2::TEXT IS NULL OR o.status = $2)
        "#,
    )
    .bind(user.user_id)
    .bind(status)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// One order, with only the items that belong to this seller.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_seller(user)?;
    ensure_involved(state, user, id).await?;

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(
            Condition::all()
                .add(OrderItemCol::OrderId.eq(order.id))
                .add(OrderItemCol::SellerId.eq(user.user_id)),
        )
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_service::order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_service::order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Seller moves an order along the fulfilment chain. Completion is the
/// customer's move; everything else goes through the transition table, and
/// cancelling puts the stock back.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_seller(user)?;
    ensure_involved(state, user, id).await?;

    let next = payload.status;
    if next == OrderStatus::Completed {
        return Err(AppError::Forbidden);
    }

    let txn = state.orm.begin().await?;

    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = order_service::parse_status(&order.status)?;
    if !current.can_transition(next) {
        return Err(AppError::BadRequest(format!(
            "Cannot move order from {current} to {next}"
        )));
    }

    if next == OrderStatus::Cancelled {
        order_service::restock_order_items(&txn, order.id).await?;
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_service::order_from_entity(order),
        Some(Meta::empty()),
    ))
}

async fn ensure_involved(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<()> {
    let involved = OrderItems::find()
        .filter(
            Condition::all()
                .add(OrderItemCol::OrderId.eq(order_id))
                .add(OrderItemCol::SellerId.eq(user.user_id)),
        )
        .count(&state.orm)
        .await?;
    if involved == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
