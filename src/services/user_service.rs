use crate::{
    db::DbPool,
    dto::users::UpdateProfileRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
};

pub async fn get_profile(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let profile: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Profile", profile, None))
}

pub async fn update_profile(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let city = payload.city.or(existing.city);

    let updated: User = sqlx::query_as(
        "UPDATE users SET name = $2, city = $3 WHERE id = $1 RETURNING *",
    )
    .bind(user.user_id)
    .bind(name)
    .bind(city)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "Profile updated",
        updated,
        Some(Meta::empty()),
    ))
}
