use actix_web::{web, HttpResponse, ResponseError};
use serde_json::Value;

use crate::{
    database::MongoDB,
    models::{UpdateUserRequest, UserResponse},
    services::user_service,
    utils::sanitize::sanitize,
    utils::validate::{parse_sanitized, run_validation},
};

#[utoipa::path(
    get,
    path = "/api",
    tag = "Users",
    responses((status = 200, description = "All users", body = [UserResponse]))
)]
pub async fn list_users(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("👥 GET /api - listing users");

    match user_service::list_users(&db).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/{id}",
    tag = "Users",
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("👤 GET /api/{}", id);

    match user_service::get_user(&db, &id).await {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/{id}",
    tag = "Users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PUT /api/{}", id);

    let clean = sanitize(&body);
    let request: UpdateUserRequest = match parse_sanitized(clean) {
        Ok(request) => request,
        Err(e) => return e.error_response(),
    };
    if let Err(e) = run_validation(&request) {
        return e.error_response();
    }

    match user_service::update_user(&db, &id, &request).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "message": "User updated successfully",
            "user": user
        })),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/{id}",
    tag = "Users",
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/{}", id);

    match user_service::delete_user(&db, &id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "User deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
