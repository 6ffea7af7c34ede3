use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Commerce Service API",
        version = "1.0.0",
        description = "E-commerce backend: user registration and login, product catalog with image upload, order management.\n\n**Authentication:** the `/api/protected` route requires a JWT Bearer token obtained from `/api/login`."
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::protected,

        // Users
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,

        // Products
        crate::api::products::create_product,
        crate::api::products::list_products,
        crate::api::products::get_product,
        crate::api::products::update_product,
        crate::api::products::delete_product,

        // Orders
        crate::api::orders::create_order,
        crate::api::orders::list_orders,
        crate::api::orders::filter_orders,
        crate::api::orders::update_order,
        crate::api::orders::delete_order,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::UpdateUserRequest,
            crate::models::UserResponse,
            crate::models::AuthResponse,
            crate::models::ProductResponse,
            crate::models::CreateOrderRequest,
            crate::models::UpdateOrderRequest,
            crate::models::OrderResponse,
            crate::models::ExpandedOrderResponse,
            crate::models::OrderUserRef,
            crate::models::OrderProductRef,
            crate::models::OrderStatus,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and the token-protected sample route."),
        (name = "Users", description = "User profile CRUD."),
        (name = "Products", description = "Product catalog with multipart image upload."),
        (name = "Orders", description = "Order management with query and date-range filters."),
        (name = "Health", description = "Service liveness."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
