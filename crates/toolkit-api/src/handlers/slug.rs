use crate::error::{HttpAppError, ValidatedJson};
use axum::Json;
use serde::{Deserialize, Serialize};
use toolkit_core::slugify;

#[derive(Debug, Deserialize)]
pub struct SlugRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlugResponse {
    pub slug: String,
}

pub async fn create_slug(
    ValidatedJson(request): ValidatedJson<SlugRequest>,
) -> Result<Json<SlugResponse>, HttpAppError> {
    let slug = slugify(&request.text)?;
    Ok(Json(SlugResponse { slug }))
}
