mod extractor;
mod principal;

pub use extractor::AuthUser;
pub use principal::Principal;
#[cfg(test)]
pub use principal::{PRINCIPAL_ID_HEADER, PRINCIPAL_IDP_HEADER, PRINCIPAL_NAME_HEADER};
