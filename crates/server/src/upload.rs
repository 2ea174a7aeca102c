//! Upload middleware for the create route.
//!
//! Consumes the request body before the handler runs and leaves an
//! [`UploadedForm`] request extension behind. A `multipart/form-data` body has
//! its files sent to the image store one by one and its text fields kept. A
//! JSON object body contributes text fields only; it can never name images.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::Json;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::state::ServerState;

/// Text fields and stored image URLs of one create request, in request order.
#[derive(Debug, Clone, Default)]
pub struct UploadedForm {
    pub fields: HashMap<String, String>,
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    Other,
}

fn body_kind(req: &Request) -> BodyKind {
    let ct = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase())
        .unwrap_or_default();
    if ct.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else if ct.starts_with("application/json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

pub async fn upload_images(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    let kind = body_kind(&req);
    if kind == BodyKind::Other {
        let mut req = req;
        req.extensions_mut().insert(UploadedForm::default());
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let mut inner = Request::new(body);
    *inner.headers_mut() = parts.headers.clone();
    *inner.extensions_mut() = parts.extensions.clone();

    let read = match kind {
        BodyKind::Multipart => read_form(&state, inner).await,
        _ => read_json(&state, inner).await,
    };
    let form = match read {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };
    info!(?kind, images = form.image_urls.len(), fields = form.fields.len(), "create form accepted");

    let mut req = Request::from_parts(parts, Body::empty());
    req.extensions_mut().insert(form);
    next.run(req).await
}

async fn read_form(state: &ServerState, req: Request) -> Result<UploadedForm, ApiError> {
    let mut multipart = Multipart::from_request(req, state).await?;
    let mut session = state.upload.start(state.images.clone());
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                debug!(%name, %filename, size = bytes.len(), "file part");
                session.accept(&name, Some(filename), content_type, bytes.to_vec()).await?;
            }
            None => {
                let text = field.text().await?;
                fields.insert(name, text);
            }
        }
    }

    Ok(UploadedForm { fields, image_urls: session.finish() })
}

async fn read_json(state: &ServerState, req: Request) -> Result<UploadedForm, ApiError> {
    let Json(object) = Json::<Map<String, Value>>::from_request(req, state).await?;
    let fields = object
        .into_iter()
        .filter_map(|(name, value)| json_text(value).map(|text| (name, text)))
        .collect();
    Ok(UploadedForm { fields, image_urls: Vec::new() })
}

/// Text form of a JSON field value. Strings and numbers carry over; booleans,
/// nulls, arrays and objects are dropped, so `"availability": true` is not
/// the literal `"true"`.
fn json_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
