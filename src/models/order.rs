use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// Stored order document. User and products are weak references by id:
/// deleting the referenced documents leaves the order untouched.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub products: Vec<ObjectId>,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

/// Create payload. `products` may be an empty sequence and `totalAmount`
/// is taken as supplied, sign included. The server does not recompute
/// totals from product prices.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
    pub products: Vec<String>,
    pub total_amount: f64,
}

/// Partial update: only supplied fields overwrite stored values.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "user is required"))]
    pub user: Option<String>,
    pub products: Option<Vec<String>>,
    pub status: Option<OrderStatus>,
    pub total_amount: Option<f64>,
}

/// Query filter for listing orders, derived from sanitized query params.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub user: Option<String>,
}

/// Date-range filter on createdAt; bounds accept RFC 3339 timestamps or
/// plain `YYYY-MM-DD` dates.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OrderDateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub user: String,
    pub products: Vec<String>,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            id: order.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            user: order.user.to_hex(),
            products: order.products.iter().map(|p| p.to_hex()).collect(),
            status: order.status,
            total_amount: order.total_amount,
            created_at: order
                .created_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
            updated_at: order
                .updated_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
        }
    }
}

/// Projection of the referenced user embedded in expanded order reads.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderUserRef {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Projection of a referenced product embedded in expanded order reads.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderProductRef {
    pub id: String,
    pub name: String,
}

/// Read-only expansion: identity references replaced by selected fields of
/// the referenced documents. A dangling reference yields `None`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedOrderResponse {
    pub id: String,
    pub user: Option<OrderUserRef>,
    pub products: Vec<OrderProductRef>,
    pub status: OrderStatus,
    pub total_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::{parse_sanitized, run_validation};
    use serde_json::json;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_create_requires_fields() {
        let missing_user: Result<CreateOrderRequest, _> =
            parse_sanitized(json!({"products": [], "totalAmount": 10.0}));
        assert!(missing_user.is_err());

        let missing_total: Result<CreateOrderRequest, _> =
            parse_sanitized(json!({"user": "64f0", "products": []}));
        assert!(missing_total.is_err());

        let non_numeric_total: Result<CreateOrderRequest, _> =
            parse_sanitized(json!({"user": "64f0", "products": [], "totalAmount": "ten"}));
        assert!(non_numeric_total.is_err());
    }

    // Documents current behavior: the schema constrains neither the sign
    // of totalAmount nor the product count.
    #[test]
    fn test_negative_total_and_empty_products_pass() {
        let request: CreateOrderRequest =
            parse_sanitized(json!({"user": "64f07e5a1c9d440000a1b2c3", "products": [], "totalAmount": -5.0}))
                .unwrap();
        assert!(run_validation(&request).is_ok());
        assert_eq!(request.total_amount, -5.0);
        assert!(request.products.is_empty());
    }
}
