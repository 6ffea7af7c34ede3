use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Catalog product: a name plus the ordered list of stored image paths.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub images: Vec<String>,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        ProductResponse {
            id: product.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: product.name.clone(),
            images: product.images.clone(),
        }
    }
}

/// Multipart form fields collected for create/update. On update, an empty
/// image list means "keep the stored images".
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_exposes_hex_id() {
        let oid = ObjectId::new();
        let product = Product {
            id: Some(oid),
            name: "Chair".to_string(),
            images: vec!["uploads/product-images/1-chair.jpg".to_string()],
        };
        let response = ProductResponse::from(&product);
        assert_eq!(response.id, oid.to_hex());
        assert_eq!(response.images.len(), 1);
    }
}
