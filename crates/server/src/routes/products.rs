use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::{info, instrument};

use common::types::MessageBody;
use models::Product;
use service::products::CreateProductInput;

use crate::errors::ApiError;
use crate::state::ServerState;
use crate::upload::UploadedForm;

pub const DELETED: &str = "Product deleted";

#[utoipa::path(get, path = "/products", tag = "products", responses(
    (status = 200, description = "All products", body = [Product]),
    (status = 500, description = "Document store failure", body = crate::openapi::ErrorResponse)
))]
#[instrument(name = "handler::list_products", skip(state))]
pub async fn list_products(State(state): State<ServerState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

#[utoipa::path(post, path = "/products", tag = "products",
    request_body(content = crate::openapi::CreateProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Missing name, bad price, or unreadable body", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Store failure, or an upload refused or failed", body = crate::openapi::ErrorResponse)
    )
)]
#[instrument(name = "handler::create_product", skip(state, form))]
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(form): Extension<UploadedForm>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let images = form.image_urls.len();
    let input = CreateProductInput::from_form(form.fields, form.image_urls);
    let created = state.products.create(input).await?;
    info!(id = %created.id, name = %created.name, images, "created product");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(delete, path = "/products/{id}", tag = "products",
    params(("id" = String, Path, description = "Product id (24 hex chars)")),
    responses(
        (status = 200, description = "Deleted, or nothing matched", body = crate::openapi::MessageResponse),
        (status = 500, description = "Malformed id or store failure", body = crate::openapi::ErrorResponse)
    )
)]
#[instrument(name = "handler::delete_product", skip(state))]
pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state.products.delete(&id).await?;
    Ok(Json(MessageBody::new(DELETED)))
}
