mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    let debug = env::var("DEBUG").map(|v| v == "true").unwrap_or(false);
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let mongo_uri = env::var("MONGO_URI").expect("MONGO_URI must be set");

    log::info!("🚀 Starting Commerce Service...");
    if debug {
        log::info!("🐛 Debug mode enabled");
    }
    if env::var("JWT_SECRET").is_err() {
        log::warn!("⚠️  JWT_SECRET not set, using an insecure default");
    }

    // Upload directory must exist before the first multipart request
    utils::upload::ensure_upload_dir().expect("Failed to create upload directory");

    // Initialize MongoDB connection; unreachable database is fatal
    let db = database::MongoDB::new(&mongo_uri)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Uploaded product images, served by relative path
            .service(actix_files::Files::new("/uploads", "uploads"))
            .service(
                web::scope("/api")
                    // Auth
                    .route("/register", web::post().to(api::auth::register))
                    .route("/login", web::post().to(api::auth::login))
                    .service(
                        web::resource("/protected")
                            .wrap(middleware::AuthMiddleware)
                            .route(web::get().to(api::auth::protected)),
                    )
                    // Products
                    .service(
                        web::scope("/products")
                            .route("", web::post().to(api::products::create_product))
                            .route("", web::get().to(api::products::list_products))
                            .route("/{id}", web::get().to(api::products::get_product))
                            .route("/{id}", web::put().to(api::products::update_product))
                            .route("/{id}", web::delete().to(api::products::delete_product)),
                    )
                    // Orders ("/filter" registered ahead of "/{id}")
                    .service(
                        web::scope("/orders")
                            .route("/filter", web::get().to(api::orders::filter_orders))
                            .route("", web::post().to(api::orders::create_order))
                            .route("", web::get().to(api::orders::list_orders))
                            .route("/{id}", web::put().to(api::orders::update_order))
                            .route("/{id}", web::delete().to(api::orders::delete_order)),
                    )
                    // Users (catch-all "/{id}" routes stay last)
                    .route("", web::get().to(api::users::list_users))
                    .route("/{id}", web::get().to(api::users::get_user))
                    .route("/{id}", web::put().to(api::users::update_user))
                    .route("/{id}", web::delete().to(api::users::delete_user)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
