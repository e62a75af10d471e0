use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::favorites::{AddFavoriteRequest, FavoritePetList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Favorite, Pet},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_favorites(
    db: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoritePetList>> {
    let (page, limit, offset) = pagination.normalize();
    let pets = sqlx::query_as::<_, Pet>(
        r#"
        SELECT p.*
        FROM favorites f
        JOIN pets p ON p.id = f.pet_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(db)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    let data = FavoritePetList { items: pets };
    Ok(ApiResponse::success("OK", data, Some(meta)))
}

pub async fn add_favorite(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    let pet_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM pets WHERE id = $1")
        .bind(payload.pet_id)
        .fetch_optional(pool)
        .await?;

    if pet_exists.is_none() {
        return Err(AppError::BadRequest("Pet not found".into()));
    }

    let existing: Option<Favorite> =
        sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 AND pet_id = $2")
            .bind(user.user_id)
            .bind(payload.pet_id)
            .fetch_optional(pool)
            .await?;

    let favorite = if let Some(fav) = existing {
        fav
    } else {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (id, user_id, pet_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user.user_id)
        .bind(payload.pet_id)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "favorite_add",
        Some("favorites"),
        Some(serde_json::json!({ "pet_id": payload.pet_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to favorites",
        favorite,
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    pool: &DbPool,
    user: &AuthUser,
    pet_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND pet_id = $2")
        .bind(user.user_id)
        .bind(pet_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "favorite_remove",
        Some("favorites"),
        Some(serde_json::json!({ "pet_id": pet_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from favorites",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
