use actix_web::{web, HttpResponse, ResponseError};
use serde_json::Value;

use crate::{
    database::MongoDB,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    services::auth_service::{self, Claims},
    utils::sanitize::sanitize,
    utils::validate::{parse_sanitized, run_validation},
};

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse),
        (status = 400, description = "Invalid input or email already exists")
    )
)]
pub async fn register(db: web::Data<MongoDB>, body: web::Json<Value>) -> HttpResponse {
    log::info!("📝 POST /api/register");

    let clean = sanitize(&body);
    let request: RegisterRequest = match parse_sanitized(clean) {
        Ok(request) => request,
        Err(e) => return e.error_response(),
    };
    if let Err(e) = run_validation(&request) {
        return e.error_response();
    }

    match auth_service::register(&db, &request).await {
        Ok(user) => HttpResponse::Created().json(serde_json::json!({
            "message": "User registered successfully",
            "user": user
        })),
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(db: web::Data<MongoDB>, body: web::Json<Value>) -> HttpResponse {
    log::info!("🔐 POST /api/login");

    let clean = sanitize(&body);
    let request: LoginRequest = match parse_sanitized(clean) {
        Ok(request) => request,
        Err(e) => return e.error_response(),
    };
    if let Err(e) = run_validation(&request) {
        return e.error_response();
    }

    match auth_service::login(&db, &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/protected",
    tag = "Auth",
    responses(
        (status = 200, description = "Access granted, decoded claims echoed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn protected(claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("🔓 GET /api/protected - user {}", claims.sub);

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Protected route, access granted",
        "user": claims.into_inner()
    }))
}
