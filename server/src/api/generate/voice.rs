use super::{RecipeResponse, UploadForm};
use crate::api::{ApiError, ErrorResponse};
use crate::AppState;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, Json};
use recipe_core::{GenerationRequest, Payload};
use utoipa::ToSchema;

/// Multipart form for voice recordings.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct VoiceForm {
    #[schema(value_type = String, format = Binary)]
    pub audio: Vec<u8>,
    /// "true" or "false".
    #[schema(rename = "isGerman")]
    pub is_german: String,
}

/// Transcribe a recording and generate a recipe from the transcript. The
/// transcript is echoed back so the client can show what was understood.
#[utoipa::path(
    post,
    path = "/api/v1/generate/by-voice",
    tag = "generate",
    request_body(content = VoiceForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recipe generated from the recording", body = RecipeResponse),
        (status = 400, description = "Missing audio or empty transcript", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 422, description = "Recording is not about a recipe", body = ErrorResponse),
        (status = 500, description = "Transcription or generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_by_voice(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let mut form = UploadForm::read(multipart?, "audio").await?;
    let locale = form.locale()?;
    let audio = form.take_file("audio")?;

    let recipe = state
        .generator
        .generate(GenerationRequest::new(Payload::Audio(audio), locale))
        .await?;
    Ok(Json(recipe.into()))
}
