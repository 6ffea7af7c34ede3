use crate::{
    database::MongoDB,
    models::{Product, ProductForm, ProductResponse},
    utils::error::AppError,
    utils::validate::parse_entity_id,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};

/// Creation requires a non-empty name and at least one uploaded image;
/// checked before anything touches the database.
fn validate_create_form(form: &ProductForm) -> Result<String, AppError> {
    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Product name and photos are required".to_string()))?;

    if form.images.is_empty() {
        return Err(AppError::Validation(
            "Product name and photos are required".to_string(),
        ));
    }

    Ok(name.to_string())
}

pub async fn create_product(db: &MongoDB, form: ProductForm) -> Result<ProductResponse, AppError> {
    let name = validate_create_form(&form)?;

    let collection = db.collection::<Product>("products");

    let mut product = Product {
        id: None,
        name,
        images: form.images,
    };

    let result = collection.insert_one(&product).await?;
    product.id = result.inserted_id.as_object_id();

    log::info!("✅ Product created: {}", product.name);

    Ok(ProductResponse::from(&product))
}

pub async fn get_product(db: &MongoDB, id: &str) -> Result<ProductResponse, AppError> {
    let oid = parse_entity_id(id, "Product")?;
    let collection = db.collection::<Product>("products");

    let product = collection
        .find_one(doc! { "_id": oid })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(ProductResponse::from(&product))
}

pub async fn list_products(db: &MongoDB) -> Result<Vec<ProductResponse>, AppError> {
    let collection = db.collection::<Product>("products");

    let products: Vec<Product> = collection.find(doc! {}).await?.try_collect().await?;

    Ok(products.iter().map(ProductResponse::from).collect())
}

/// Partial merge. The image list is replaced wholesale when the update
/// carries new uploads, otherwise the stored images stay untouched.
pub async fn update_product(
    db: &MongoDB,
    id: &str,
    form: ProductForm,
) -> Result<ProductResponse, AppError> {
    let oid = parse_entity_id(id, "Product")?;
    let collection = db.collection::<Product>("products");

    let mut set = Document::new();
    if let Some(name) = form.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        set.insert("name", name);
    }
    if !form.images.is_empty() {
        set.insert("images", form.images.clone());
    }

    if set.is_empty() {
        // Nothing supplied: answer with the stored document unchanged.
        return get_product(db, id).await;
    }

    let updated = collection
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
        .return_document(mongodb::options::ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    log::info!("✅ Product updated: {}", id);

    Ok(ProductResponse::from(&updated))
}

/// No cascade: orders referencing the product keep their dangling ref.
pub async fn delete_product(db: &MongoDB, id: &str) -> Result<(), AppError> {
    let oid = parse_entity_id(id, "Product")?;
    let collection = db.collection::<Product>("products");

    let result = collection.delete_one(doc! { "_id": oid }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    log::info!("🗑️ Product deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: Option<&str>, images: &[&str]) -> ProductForm {
        ProductForm {
            name: name.map(String::from),
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_form_requires_name_and_images() {
        assert!(validate_create_form(&form(None, &["a.jpg"])).is_err());
        assert!(validate_create_form(&form(Some("   "), &["a.jpg"])).is_err());
        assert!(validate_create_form(&form(Some("Chair"), &[])).is_err());

        let name = validate_create_form(&form(Some("  Chair "), &["a.jpg"])).unwrap();
        assert_eq!(name, "Chair");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_crud_roundtrip() {
        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/commerce_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let created = create_product(&db, form(Some("Chair"), &["uploads/p/1-a.jpg"]))
            .await
            .unwrap();
        let fetched = get_product(&db, &created.id).await.unwrap();
        assert_eq!(fetched.name, "Chair");
        assert_eq!(fetched.images, created.images);

        // Update without new images keeps the stored list.
        let updated = update_product(&db, &created.id, form(Some("Armchair"), &[]))
            .await
            .unwrap();
        assert_eq!(updated.name, "Armchair");
        assert_eq!(updated.images, created.images);

        delete_product(&db, &created.id).await.unwrap();
        assert!(matches!(
            get_product(&db, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
