use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, ResponseError};
use futures_util::StreamExt as _;

use crate::{
    database::MongoDB,
    models::{ProductForm, ProductResponse},
    services::product_service,
    utils::error::AppError,
    utils::upload,
};

/// Collects the multipart form: a `name` text field plus any number of
/// `photos[]` file fields. Files are persisted as they stream in, capped
/// at 5 MB each; unknown fields are drained and ignored.
async fn collect_form(mut payload: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Validation(e.to_string()))?;
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "name" => {
                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| AppError::Validation(e.to_string()))?;
                    data.extend_from_slice(&chunk);
                }
                form.name = Some(String::from_utf8_lossy(&data).trim().to_string());
            }
            "photos[]" | "photos" => {
                let original = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or("upload")
                    .to_string();

                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| AppError::Validation(e.to_string()))?;
                    data.extend_from_slice(&chunk);
                    if data.len() > upload::MAX_FILE_BYTES {
                        return Err(AppError::Validation(format!(
                            "File '{}' exceeds the 5 MB upload limit",
                            original
                        )));
                    }
                }

                if !data.is_empty() {
                    form.images.push(upload::save_file(&original, &data)?);
                }
            }
            _ => {
                // Drain unrecognized fields so the stream can advance.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| AppError::Validation(e.to_string()))?;
                }
            }
        }
    }

    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Name or photos missing")
    )
)]
pub async fn create_product(db: web::Data<MongoDB>, payload: Multipart) -> HttpResponse {
    log::info!("📦 POST /api/products");

    let form = match collect_form(payload).await {
        Ok(form) => form,
        Err(e) => return e.error_response(),
    };

    match product_service::create_product(&db, form).await {
        Ok(product) => HttpResponse::Created().json(product),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "All products", body = [ProductResponse]))
)]
pub async fn list_products(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📦 GET /api/products");

    match product_service::list_products(&db).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("📦 GET /api/products/{}", id);

    match product_service::get_product(&db, &id).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    db: web::Data<MongoDB>,
    path: web::Path<String>,
    payload: Multipart,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PUT /api/products/{}", id);

    let form = match collect_form(payload).await {
        Ok(form) => form,
        Err(e) => return e.error_response(),
    };

    match product_service::update_product(&db, &id, form).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(e) => e.error_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/products/{}", id);

    match product_service::delete_product(&db, &id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Product deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}
