//! Generation endpoints, one per input modality. Nothing is persisted here;
//! the client saves a result through add-recipe.

pub mod description;
pub mod image;
pub mod link;
pub mod voice;

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::routing::post;
use axum::Router;
use recipe_core::ai::prompts::Locale;
use recipe_core::{GeneratedRecipe, MAX_FILE_SIZE};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Room for multipart boundaries and the small text fields next to the file.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn router() -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/v1/generate/by-image", post(image::generate_by_image))
        .route("/api/v1/generate/by-voice", post(voice::generate_by_voice))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + FORM_OVERHEAD));

    Router::new()
        .route(
            "/api/v1/generate/by-description",
            post(description::generate_by_description),
        )
        .route("/api/v1/generate/by-link", post(link::generate_by_link))
        .merge(uploads)
}

/// A generated recipe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub recipename: String,
    pub recipe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl From<GeneratedRecipe> for RecipeResponse {
    fn from(recipe: GeneratedRecipe) -> Self {
        Self {
            recipename: recipe.name,
            recipe: recipe.body,
            transcript: recipe.transcript,
            category: Some(recipe.category),
            id: recipe.id,
        }
    }
}

/// Fields of an upload form.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub file: Option<Vec<u8>>,
    pub is_german: Option<String>,
    pub recipename: Option<String>,
    pub recipecategory: Option<String>,
}

impl UploadForm {
    /// Read all fields; the file part is taken from `file_field`.
    /// Unknown fields are ignored.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                n if n == file_field => {
                    let bytes = field.bytes().await?;
                    if bytes.len() > MAX_FILE_SIZE {
                        return Err(ApiError::BadRequest(format!(
                            "File too large: {} bytes (max {})",
                            bytes.len(),
                            MAX_FILE_SIZE
                        )));
                    }
                    form.file = Some(bytes.to_vec());
                }
                "isGerman" => form.is_german = Some(field.text().await?),
                "recipename" => form.recipename = Some(field.text().await?),
                "recipecategory" => form.recipecategory = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }

    pub fn locale(&self) -> Result<Locale, ApiError> {
        let raw = self
            .is_german
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Missing isGerman field".to_string()))?;
        Locale::parse_flag(raw).ok_or_else(|| {
            ApiError::BadRequest("Invalid isGerman value, expected \"true\" or \"false\"".to_string())
        })
    }

    pub fn take_file(&mut self, field: &str) -> Result<Vec<u8>, ApiError> {
        self.file
            .take()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ApiError::BadRequest(format!("Missing {field} file")))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        description::generate_by_description,
        link::generate_by_link,
        image::generate_by_image,
        voice::generate_by_voice,
    ),
    components(schemas(
        RecipeResponse,
        description::DescriptionRequest,
        link::LinkRequest,
        image::ImageForm,
        voice::VoiceForm,
    ))
)]
pub struct ApiDoc;
