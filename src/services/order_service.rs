use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        pets::{Column as PetCol, Entity as Pets},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    order_status::OrderStatus,
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::coupon_service,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .all(&txn)
        .await?;

    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let pet_ids: Vec<Uuid> = cart.iter().map(|line| line.pet_id).collect();
    let pets = Pets::find()
        .filter(PetCol::Id.is_in(pet_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let pets_by_id: HashMap<Uuid, _> = pets.into_iter().map(|p| (p.id, p)).collect();

    let mut lines: Vec<(i64, i32)> = Vec::with_capacity(cart.len());
    for line in &cart {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        let pet = pets_by_id
            .get(&line.pet_id)
            .ok_or_else(|| AppError::BadRequest("Pet is no longer available".into()))?;
        if pet.stock < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                pet.name
            )));
        }
        lines.push((pet.price, line.quantity));
    }

    let items_price = pricing::items_price(lines);
    let shipping_fee = state.pricing.shipping_fee_for(items_price);

    let coupon_code = payload
        .coupon_code
        .as_ref()
        .filter(|code| !code.is_empty())
        .cloned();
    let discount = match coupon_code.as_deref() {
        Some(code) => coupon_service::resolve_discount(&txn, code, items_price).await?,
        None => 0,
    };

    let total_amount = pricing::order_total(items_price, shipping_fee, discount);

    let order_id = Uuid::new_v4();
    let invoice_number = build_invoice_number(order_id);

    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        status: Set(OrderStatus::Pending.as_str().into()),
        payment_status: Set("unpaid".into()),
        invoice_number: Set(invoice_number),
        address: Set(payload.address),
        payment_method: Set(payload.payment_method),
        items_price: Set(items_price),
        shipping_fee: Set(shipping_fee),
        discount: Set(discount),
        coupon_code: Set(coupon_code),
        total_amount: Set(total_amount),
        paid_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::new();

    for line in &cart {
        let pet = &pets_by_id[&line.pet_id];
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            pet_id: Set(line.pet_id),
            seller_id: Set(pet.seller_id),
            quantity: Set(line.quantity),
            price: Set(pet.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_items.push(order_item_from_entity(item));

        // reduce stock
        Pets::update_many()
            .col_expr(PetCol::Stock, Expr::col(PetCol::Stock).sub(line.quantity))
            .filter(PetCol::Id.eq(line.pet_id))
            .exec(&txn)
            .await?;
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: order_from_entity(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn pay_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PayOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.invoice_number != payload.invoice_number {
        return Err(AppError::BadRequest("Invoice number mismatch".into()));
    }
    if order.payment_status == "paid" {
        return Err(AppError::BadRequest("Order already paid".into()));
    }

    let mut active: OrderActive = order.into();
    active.payment_status = Set("paid".into());
    active.paid_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_paid",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment recorded",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Customer confirms the order arrived, closing `delivered -> completed`.
pub async fn receive_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = parse_status(&order.status)?;
    if !current.can_transition(OrderStatus::Completed) {
        return Err(AppError::BadRequest(format!(
            "Cannot complete an order that is {current}"
        )));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Completed.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_received",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order completed",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Customer cancels while the order is still pending or confirmed. The stock
/// the checkout took is put back inside the same transaction.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = parse_status(&order.status)?;
    if !current.is_cancellable() {
        return Err(AppError::BadRequest(format!(
            "Cannot cancel an order that is {current}"
        )));
    }

    restock_order_items(&txn, order.id).await?;

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancelled",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn parse_status(status: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::parse(status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unknown order status {status}")))
}

/// Put back the stock an order's items took at checkout.
pub(crate) async fn restock_order_items(
    txn: &DatabaseTransaction,
    order_id: Uuid,
) -> AppResult<()> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(txn)
        .await?;
    for item in items {
        Pets::update_many()
            .col_expr(PetCol::Stock, Expr::col(PetCol::Stock).add(item.quantity))
            .filter(PetCol::Id.eq(item.pet_id))
            .exec(txn)
            .await?;
    }
    Ok(())
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        status: model.status,
        payment_status: model.payment_status,
        invoice_number: model.invoice_number,
        address: model.address,
        payment_method: model.payment_method,
        items_price: model.items_price,
        shipping_fee: model.shipping_fee,
        discount: model.discount,
        coupon_code: model.coupon_code,
        total_amount: model.total_amount,
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        pet_id: model.pet_id,
        seller_id: model.seller_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("INV-{}-{}", date, short)
}
