use actix_web::{web, HttpResponse, ResponseError};
use serde_json::{Map, Value};

use crate::{
    database::MongoDB,
    models::{
        CreateOrderRequest, ExpandedOrderResponse, OrderDateRangeQuery, OrderListQuery,
        OrderResponse, UpdateOrderRequest,
    },
    services::order_service,
    utils::error::AppError,
    utils::sanitize::{sanitize, sanitize_query},
    utils::validate::{parse_sanitized, run_validation},
};

/// Query-string pairs → sanitized JSON object → typed filter. Unknown
/// keys are dropped by the target type, operator-shaped keys by the
/// sanitizer.
fn parse_query<T: serde::de::DeserializeOwned>(
    pairs: &[(String, String)],
) -> Result<T, AppError> {
    let clean = sanitize_query(pairs);
    let mut map = Map::new();
    for (key, value) in clean {
        map.insert(key, Value::String(value));
    }
    parse_sanitized(Value::Object(map))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_order(db: web::Data<MongoDB>, body: web::Json<Value>) -> HttpResponse {
    log::info!("🧾 POST /api/orders");

    let clean = sanitize(&body);
    let request: CreateOrderRequest = match parse_sanitized(clean) {
        Ok(request) => request,
        Err(e) => return e.error_response(),
    };
    if let Err(e) = run_validation(&request) {
        return e.error_response();
    }

    match order_service::create_order(&db, &request).await {
        Ok(order) => HttpResponse::Created().json(order),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Orders with expanded references", body = [ExpandedOrderResponse]))
)]
pub async fn list_orders(
    db: web::Data<MongoDB>,
    query: web::Query<Vec<(String, String)>>,
) -> HttpResponse {
    log::info!("🧾 GET /api/orders");

    let list_query: OrderListQuery = match parse_query(&query) {
        Ok(q) => q,
        Err(e) => return e.error_response(),
    };

    match order_service::list_orders(&db, &list_query).await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/orders/filter",
    tag = "Orders",
    params(OrderDateRangeQuery),
    responses((status = 200, description = "Orders in the createdAt range", body = [ExpandedOrderResponse]))
)]
pub async fn filter_orders(
    db: web::Data<MongoDB>,
    query: web::Query<Vec<(String, String)>>,
) -> HttpResponse {
    log::info!("🧾 GET /api/orders/filter");

    let range: OrderDateRangeQuery = match parse_query(&query) {
        Ok(q) => q,
        Err(e) => return e.error_response(),
    };

    match order_service::filter_orders_by_date(&db, &range).await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Orders",
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PUT /api/orders/{}", id);

    let clean = sanitize(&body);
    let request: UpdateOrderRequest = match parse_sanitized(clean) {
        Ok(request) => request,
        Err(e) => return e.error_response(),
    };
    if let Err(e) = run_validation(&request) {
        return e.error_response();
    }

    match order_service::update_order(&db, &id, &request).await {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/orders/{}", id);

    match order_service::delete_order(&db, &id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Order deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
