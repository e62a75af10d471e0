use chrono::DateTime;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList, UpdateQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Pet,
    pricing::PricingConfig,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

#[derive(FromRow)]
struct CartWithPetRow {
    cart_id: Uuid,
    quantity: i32,
    pet_id: Uuid,
    seller_id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    gender: Option<String>,
    city: Option<String>,
    images: serde_json::Value,
    created_at: DateTime<chrono::Utc>,
}

pub async fn list_cart(
    pool: &DbPool,
    pricing: &PricingConfig,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartWithPetRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS pet_id, p.seller_id, p.category_id, p.name, p.description,
               p.price, p.stock, p.gender, p.city, p.images, p.created_at
        FROM cart_items ci
        JOIN pets p ON p.id = ci.pet_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    // Totals cover the whole cart, not just the page being shown.
    let subtotal: (Option<i64>,) = sqlx::query_as(
        r#"
        SELECT SUM(p.price * ci.quantity)::BIGINT
        FROM cart_items ci
        JOIN pets p ON p.id = ci.pet_id
        WHERE ci.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;
    let items_price = subtotal.0.unwrap_or(0);
    let shipping_fee = pricing.shipping_fee_for(items_price);

    let items = rows
        .into_iter()
        .map(|row| CartItemDto {
            id: row.cart_id,
            pet: Pet {
                id: row.pet_id,
                seller_id: row.seller_id,
                category_id: row.category_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                gender: row.gender,
                city: row.city,
                images: row.images,
                created_at: row.created_at,
            },
            quantity: row.quantity,
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        CartList {
            items,
            items_price,
            shipping_fee,
        },
        Some(meta),
    ))
}

pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<crate::models::CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let pet_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM pets WHERE id = $1")
        .bind(payload.pet_id)
        .fetch_optional(pool)
        .await?;
    if pet_exist.is_none() {
        return Err(AppError::BadRequest("pet not found".to_string()));
    }

    // Adding an already-carted pet merges into the existing line by summing
    // quantities; there is never more than one line per pet.
    let cart_item = sqlx::query_as::<_, crate::models::CartItem>(
        r#"
        INSERT INTO cart_items (user_id, pet_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, pet_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(payload.pet_id)
    .bind(payload.quantity)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "pet_id": payload.pet_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn update_quantity(
    pool: &DbPool,
    user: &AuthUser,
    pet_id: Uuid,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<crate::models::CartItem>> {
    // The requested quantity is floored at 1; removal is its own endpoint.
    let quantity = payload.quantity.max(1);

    let cart_item = sqlx::query_as::<_, crate::models::CartItem>(
        r#"
        UPDATE cart_items
        SET quantity = $3
        WHERE user_id = $1 AND pet_id = $2
        RETURNING *
        "#,
    )
    .bind(user.user_id)
    .bind(pet_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await?;

    let cart_item = match cart_item {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "pet_id": pet_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    pet_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE pet_id = $1 AND user_id = $2")
        .bind(pet_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "pet_id": pet_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
