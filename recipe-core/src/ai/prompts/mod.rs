//! AI prompt templates.

pub mod category;
pub mod generate;
pub mod judge;
pub mod locale;
pub mod name;

pub use generate::{build_prompt, Modality, PromptInput, PromptSpec};
pub use locale::{Locale, LocaleTemplates};
