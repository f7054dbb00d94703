//! Publishing steps shared by the add, update, delete and login flows.

use thiserror::Error;

use super::index::{recipe_path, render_index, INDEX_PATH};
use super::{PublishError, Publisher};
use crate::store::{RecipeStore, StoreError, User};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Mirror one recipe as a Markdown file in the user's site.
pub async fn publish_recipe(
    publisher: &dyn Publisher,
    account: &str,
    name: &str,
    content: &str,
) -> Result<(), PublishError> {
    publisher
        .publish(account, &recipe_path(name), content)
        .await
}

/// Re-render the user's index from the store and publish it.
pub async fn publish_index(
    publisher: &dyn Publisher,
    store: &dyn RecipeStore,
    user: &User,
) -> Result<(), SiteError> {
    let recipes = store.list_recipes(user.id).await?;
    let index = render_index(&recipes);
    publisher
        .publish(&user.storage_account, INDEX_PATH, &index)
        .await?;
    tracing::debug!(
        account = %user.storage_account,
        recipes = recipes.len(),
        "Published index"
    );
    Ok(())
}
