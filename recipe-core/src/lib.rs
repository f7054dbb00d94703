pub mod ai;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod image;
pub mod judge;
pub mod postprocess;
pub mod publish;
pub mod store;

pub use error::FetchError;
pub use fetch::{MockFetcher, PageFetcher, ReqwestFetcher};
pub use generate::{GenerateError, GeneratedRecipe, GenerationRequest, Payload, RecipeGenerator};
pub use image::{validate_image, MAX_FILE_SIZE};
pub use judge::is_recipe_related;
pub use postprocess::{category_from, match_category, name_from, Category};
pub use store::{
    random_account_name, MemoryStore, NewUser, RecipeDraft, RecipeStore, StoreError,
    StoredRecipe, User,
};
