//! Relational persistence contract for users and recipes.
//!
//! The server implements [`RecipeStore`] on Postgres; [`MemoryStore`] backs
//! tests and local runs without a database.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Length of generated storage account names.
pub const ACCOUNT_NAME_LEN: usize = 8;

const ACCOUNT_NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    /// Principal id from the identity provider.
    pub oauth_id: String,
    pub name: String,
    pub provider: String,
    /// Storage account (site) the user's recipes are published to.
    pub storage_account: String,
}

/// Fields needed to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub oauth_id: String,
    pub name: String,
    pub provider: String,
    pub storage_account: String,
}

/// Recipe fields written by add and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub content: String,
    pub category: String,
}

/// A persisted recipe, returned exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub content: String,
    pub category: String,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find_user(&self, oauth_id: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Insert a recipe and return its id.
    async fn insert_recipe(&self, user_id: i32, recipe: RecipeDraft) -> Result<i32, StoreError>;

    /// Update a recipe owned by `user_id`. Returns false when no such recipe exists.
    async fn update_recipe(
        &self,
        id: i32,
        user_id: i32,
        recipe: RecipeDraft,
    ) -> Result<bool, StoreError>;

    /// Delete a recipe owned by `user_id`. Returns false when no such recipe exists.
    async fn delete_recipe(&self, id: i32, user_id: i32) -> Result<bool, StoreError>;

    /// All recipes of `user_id`, ordered by id.
    async fn list_recipes(&self, user_id: i32) -> Result<Vec<StoredRecipe>, StoreError>;
}

/// Random lowercase alphanumeric account name.
pub fn random_account_name() -> String {
    let mut rng = rand::rng();
    (0..ACCOUNT_NAME_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ACCOUNT_NAME_CHARSET.len());
            ACCOUNT_NAME_CHARSET[idx] as char
        })
        .collect()
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    recipes: Vec<StoredRecipe>,
    next_user_id: i32,
    next_recipe_id: i32,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string().into()))
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn find_user(&self, oauth_id: &str) -> Result<Option<User>, StoreError> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.oauth_id == oauth_id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.oauth_id == user.oauth_id) {
            return Err(StoreError::Backend(
                format!("user {} already exists", user.oauth_id).into(),
            ));
        }
        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            oauth_id: user.oauth_id,
            name: user.name,
            provider: user.provider,
            storage_account: user.storage_account,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn insert_recipe(&self, user_id: i32, recipe: RecipeDraft) -> Result<i32, StoreError> {
        let mut state = self.lock()?;
        state.next_recipe_id += 1;
        let id = state.next_recipe_id;
        state.recipes.push(StoredRecipe {
            id,
            user_id,
            name: recipe.name,
            content: recipe.content,
            category: recipe.category,
        });
        Ok(id)
    }

    async fn update_recipe(
        &self,
        id: i32,
        user_id: i32,
        recipe: RecipeDraft,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        match state
            .recipes
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        {
            Some(stored) => {
                stored.name = recipe.name;
                stored.content = recipe.content;
                stored.category = recipe.category;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_recipe(&self, id: i32, user_id: i32) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let before = state.recipes.len();
        state
            .recipes
            .retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(state.recipes.len() < before)
    }

    async fn list_recipes(&self, user_id: i32) -> Result<Vec<StoredRecipe>, StoreError> {
        let state = self.lock()?;
        let mut recipes: Vec<StoredRecipe> = state
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        recipes.sort_by_key(|r| r.id);
        Ok(recipes)
    }
}
