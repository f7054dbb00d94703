use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use recipe_core::{NewUser, RecipeDraft, RecipeStore, StoreError, StoredRecipe, User};

use crate::models;
use crate::schema::{recipes, users};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create database pool");

    // Run pending migrations on startup
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");

    pool
}

/// Postgres-backed [`RecipeStore`]. Diesel is synchronous, so each query
/// runs on the blocking thread pool with a connection from `pool`.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConn) -> Result<T, diesel::result::Error> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(StoreError::backend)?;
            f(&mut conn).map_err(StoreError::backend)
        })
        .await
        .map_err(StoreError::backend)?
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn find_user(&self, oauth_id: &str) -> Result<Option<User>, StoreError> {
        let oauth_id = oauth_id.to_string();
        self.with_conn(move |conn| {
            users::table
                .filter(users::oauth_id.eq(&oauth_id))
                .select(models::User::as_select())
                .first(conn)
                .optional()
        })
        .await
        .map(|user| user.map(Into::into))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&models::NewUser {
                    oauth_id: &user.oauth_id,
                    name: &user.name,
                    oauth_provider: &user.provider,
                    subdomain: &user.storage_account,
                })
                .returning(models::User::as_returning())
                .get_result(conn)
        })
        .await
        .map(Into::into)
    }

    async fn insert_recipe(&self, user_id: i32, recipe: RecipeDraft) -> Result<i32, StoreError> {
        self.with_conn(move |conn| {
            diesel::insert_into(recipes::table)
                .values(&models::NewRecipe {
                    user_id,
                    title: &recipe.name,
                    content: &recipe.content,
                    category: &recipe.category,
                })
                .returning(recipes::id)
                .get_result(conn)
        })
        .await
    }

    async fn update_recipe(
        &self,
        id: i32,
        user_id: i32,
        recipe: RecipeDraft,
    ) -> Result<bool, StoreError> {
        self.with_conn(move |conn| {
            diesel::update(
                recipes::table
                    .filter(recipes::id.eq(id))
                    .filter(recipes::user_id.eq(user_id)),
            )
            .set(&models::RecipeChanges {
                title: &recipe.name,
                content: &recipe.content,
                category: &recipe.category,
            })
            .execute(conn)
        })
        .await
        .map(|rows| rows > 0)
    }

    async fn delete_recipe(&self, id: i32, user_id: i32) -> Result<bool, StoreError> {
        self.with_conn(move |conn| {
            diesel::delete(
                recipes::table
                    .filter(recipes::id.eq(id))
                    .filter(recipes::user_id.eq(user_id)),
            )
            .execute(conn)
        })
        .await
        .map(|rows| rows > 0)
    }

    async fn list_recipes(&self, user_id: i32) -> Result<Vec<StoredRecipe>, StoreError> {
        self.with_conn(move |conn| {
            recipes::table
                .filter(recipes::user_id.eq(user_id))
                .order(recipes::id.asc())
                .select(models::Recipe::as_select())
                .load(conn)
        })
        .await
        .map(|rows| rows.into_iter().map(Into::into).collect())
    }
}
