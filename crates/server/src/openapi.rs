use utoipa::OpenApi;
use utoipa::ToSchema;

use models::Product;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(ToSchema)]
pub struct MessageResponse { pub message: String }

/// Multipart fields accepted by `POST /products`. Every field is text;
/// `images` repeats once per file. A JSON object with the same text fields
/// (and `price` as a number or text) is accepted too, without images.
#[derive(ToSchema)]
pub struct CreateProductForm {
    pub name: String,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Exactly `true` marks the product available.
    pub availability: Option<String>,
    /// Up to 10 files, jpg/png/jpeg.
    #[schema(value_type = Vec<String>)]
    pub images: Vec<Vec<u8>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::delete_product,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            CreateProductForm,
            Product,
        )
    ),
    tags(
        (name = "health"),
        (name = "products")
    )
)]
pub struct ApiDoc;
