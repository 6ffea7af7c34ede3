use crate::{
    database::MongoDB,
    models::{
        CreateOrderRequest, ExpandedOrderResponse, Order, OrderDateRangeQuery, OrderListQuery,
        OrderProductRef, OrderResponse, OrderStatus, OrderUserRef, Product, UpdateOrderRequest,
        User,
    },
    utils::error::AppError,
    utils::validate::parse_entity_id,
};
use chrono::{DateTime, NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use std::collections::HashMap;

/// Body references arrive as hex strings; a malformed one is a client
/// error, not a missing document.
fn parse_ref(id: &str, field: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| AppError::Validation(format!("{} must be a valid id", field)))
}

/// Accepts RFC 3339 timestamps or plain dates (taken as midnight UTC).
fn parse_date_bound(raw: &str, field: &str) -> Result<BsonDateTime, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(BsonDateTime::from_millis(dt.timestamp_millis()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC);
        return Ok(BsonDateTime::from_millis(midnight.timestamp_millis()));
    }
    Err(AppError::Validation(format!(
        "{} must be an ISO date (YYYY-MM-DD or RFC 3339)",
        field
    )))
}

fn build_list_filter(query: &OrderListQuery) -> Result<Document, AppError> {
    let mut filter = Document::new();
    if let Some(status) = query.status {
        let bson = mongodb::bson::ser::to_bson(&status)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        filter.insert("status", bson);
    }
    if let Some(user) = &query.user {
        filter.insert("user", parse_ref(user, "user")?);
    }
    Ok(filter)
}

fn build_date_filter(query: &OrderDateRangeQuery) -> Result<Document, AppError> {
    let mut bounds = Document::new();
    if let Some(start) = query.start_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        bounds.insert("$gte", parse_date_bound(start, "startDate")?);
    }
    if let Some(end) = query.end_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        bounds.insert("$lte", parse_date_bound(end, "endDate")?);
    }

    let mut filter = Document::new();
    if !bounds.is_empty() {
        filter.insert("created_at", bounds);
    }
    Ok(filter)
}

/// Persists a new order. References are taken as supplied: existence of
/// the user and products is not checked, and the total is not recomputed.
pub async fn create_order(
    db: &MongoDB,
    request: &CreateOrderRequest,
) -> Result<OrderResponse, AppError> {
    let user = parse_ref(&request.user, "user")?;
    let products = request
        .products
        .iter()
        .map(|p| parse_ref(p, "products"))
        .collect::<Result<Vec<_>, _>>()?;

    let collection = db.collection::<Order>("orders");

    let mut order = Order {
        id: None,
        user,
        products,
        status: OrderStatus::default(),
        total_amount: request.total_amount,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    let result = collection.insert_one(&order).await?;
    order.id = result.inserted_id.as_object_id();

    log::info!("✅ Order created for user {}", request.user);

    Ok(OrderResponse::from(&order))
}

/// Partial merge: only supplied fields are written.
pub async fn update_order(
    db: &MongoDB,
    id: &str,
    request: &UpdateOrderRequest,
) -> Result<OrderResponse, AppError> {
    let oid = parse_entity_id(id, "Order")?;
    let collection = db.collection::<Order>("orders");

    let mut set = Document::new();
    if let Some(user) = &request.user {
        set.insert("user", parse_ref(user, "user")?);
    }
    if let Some(products) = &request.products {
        let refs = products
            .iter()
            .map(|p| parse_ref(p, "products"))
            .collect::<Result<Vec<_>, _>>()?;
        set.insert("products", refs);
    }
    if let Some(status) = request.status {
        let bson = mongodb::bson::ser::to_bson(&status)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        set.insert("status", bson);
    }
    if let Some(total) = request.total_amount {
        set.insert("total_amount", total);
    }
    set.insert("updated_at", BsonDateTime::now());

    let updated = collection
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
        .return_document(mongodb::options::ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    log::info!("✅ Order updated: {}", id);

    Ok(OrderResponse::from(&updated))
}

pub async fn delete_order(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let oid = parse_entity_id(id, "Order")?;
    let collection = db.collection::<Order>("orders");

    let result = collection.delete_one(doc! { "_id": oid }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Order not found".to_string()));
    }

    log::info!("🗑️ Order deleted: {}", id);
    Ok(())
}

/// Lists orders matching the sanitized query filter, with references
/// expanded for response convenience.
pub async fn list_orders(
    db: &MongoDB,
    query: &OrderListQuery,
) -> Result<Vec<ExpandedOrderResponse>, AppError> {
    let filter = build_list_filter(query)?;
    let collection = db.collection::<Order>("orders");

    let orders: Vec<Order> = collection.find(filter).await?.try_collect().await?;

    expand_orders(db, orders).await
}

/// Orders whose createdAt falls inside the optional [start, end] range.
pub async fn filter_orders_by_date(
    db: &MongoDB,
    query: &OrderDateRangeQuery,
) -> Result<Vec<ExpandedOrderResponse>, AppError> {
    let filter = build_date_filter(query)?;
    let collection = db.collection::<Order>("orders");

    let orders: Vec<Order> = collection.find(filter).await?.try_collect().await?;

    expand_orders(db, orders).await
}

/// Replaces identity references with selected fields of the referenced
/// documents, via explicit secondary lookups. Read-only projection: a
/// reference whose document is gone expands to nothing.
async fn expand_orders(
    db: &MongoDB,
    orders: Vec<Order>,
) -> Result<Vec<ExpandedOrderResponse>, AppError> {
    let user_ids: Vec<ObjectId> = orders.iter().map(|o| o.user).collect();
    let product_ids: Vec<ObjectId> = orders.iter().flat_map(|o| o.products.clone()).collect();

    let users = db.collection::<User>("users");
    let user_map: HashMap<ObjectId, User> = users
        .find(doc! { "_id": { "$in": user_ids } })
        .await?
        .try_collect::<Vec<User>>()
        .await?
        .into_iter()
        .filter_map(|u| u.id.map(|oid| (oid, u)))
        .collect();

    let products = db.collection::<Product>("products");
    let product_map: HashMap<ObjectId, Product> = products
        .find(doc! { "_id": { "$in": product_ids } })
        .await?
        .try_collect::<Vec<Product>>()
        .await?
        .into_iter()
        .filter_map(|p| p.id.map(|oid| (oid, p)))
        .collect();

    Ok(orders
        .iter()
        .map(|order| ExpandedOrderResponse {
            id: order.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            user: user_map.get(&order.user).map(|u| OrderUserRef {
                id: order.user.to_hex(),
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
                email: u.email.clone(),
            }),
            products: order
                .products
                .iter()
                .filter_map(|pid| {
                    product_map.get(pid).map(|p| OrderProductRef {
                        id: pid.to_hex(),
                        name: p.name.clone(),
                    })
                })
                .collect(),
            status: order.status,
            total_amount: order.total_amount,
            created_at: order
                .created_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
            updated_at: order
                .updated_at
                .and_then(|d| d.try_to_rfc3339_string().ok()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ref() {
        assert!(parse_ref("64f07e5a1c9d440000a1b2c3", "user").is_ok());
        assert!(matches!(
            parse_ref("garbage", "user"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_date_bound_formats() {
        let plain = parse_date_bound("2024-03-01", "startDate").unwrap();
        assert_eq!(plain.try_to_rfc3339_string().unwrap(), "2024-03-01T00:00:00Z");

        let precise = parse_date_bound("2024-03-01T12:30:00Z", "startDate").unwrap();
        assert_eq!(
            precise.timestamp_millis() - plain.timestamp_millis(),
            (12 * 3600 + 30 * 60) * 1000
        );

        assert!(matches!(
            parse_date_bound("march first", "startDate"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_build_list_filter() {
        let empty = build_list_filter(&OrderListQuery {
            status: None,
            user: None,
        })
        .unwrap();
        assert!(empty.is_empty());

        let full = build_list_filter(&OrderListQuery {
            status: Some(OrderStatus::Completed),
            user: Some("64f07e5a1c9d440000a1b2c3".to_string()),
        })
        .unwrap();
        assert_eq!(full.get_str("status").unwrap(), "completed");
        assert!(full.get_object_id("user").is_ok());
    }

    #[test]
    fn test_build_date_filter_bounds() {
        let none = build_date_filter(&OrderDateRangeQuery {
            start_date: None,
            end_date: Some("   ".to_string()),
        })
        .unwrap();
        assert!(none.is_empty());

        let both = build_date_filter(&OrderDateRangeQuery {
            start_date: Some("2024-03-01".to_string()),
            end_date: Some("2024-03-31".to_string()),
        })
        .unwrap();
        let bounds = both.get_document("created_at").unwrap();
        assert!(bounds.get("$gte").is_some());
        assert!(bounds.get("$lte").is_some());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_order_crud_and_expansion() {
        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/commerce_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let request = CreateOrderRequest {
            user: ObjectId::new().to_hex(),
            products: vec![ObjectId::new().to_hex()],
            total_amount: 42.5,
        };
        let created = create_order(&db, &request).await.unwrap();
        assert_eq!(created.status, OrderStatus::Pending);
        assert_eq!(created.total_amount, 42.5);

        // Dangling references expand to nothing, the order still lists.
        let listed = list_orders(
            &db,
            &OrderListQuery {
                status: Some(OrderStatus::Pending),
                user: Some(request.user.clone()),
            },
        )
        .await
        .unwrap();
        assert!(listed.iter().any(|o| o.id == created.id));

        delete_order(&db, &created.id).await.unwrap();
        assert!(matches!(
            delete_order(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
