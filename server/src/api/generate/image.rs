use super::{RecipeResponse, UploadForm};
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, Json};
use recipe_core::{validate_image, GenerationRequest, Payload};
use utoipa::ToSchema;

/// Multipart form for image uploads.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImageForm {
    /// JPEG, PNG, GIF or WebP, at most 10 MiB.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// "true" or "false".
    #[schema(rename = "isGerman")]
    pub is_german: String,
    pub recipename: Option<String>,
    pub recipecategory: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/generate/by-image",
    tag = "generate",
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recipe transcribed from the photo", body = RecipeResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_by_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut form = UploadForm::read(multipart?, "image").await?;
    let locale = form.locale()?;
    let bytes = form.take_file("image")?;
    let image = validate_image(&bytes).map_err(ApiError::BadRequest)?;

    let mut request = GenerationRequest::new(Payload::Image(image), locale);
    request.name = form.recipename.take();
    request.category = form.recipecategory.take();

    let recipe = state.generator.generate(request).await?;
    Ok(Json(recipe.into()))
}
