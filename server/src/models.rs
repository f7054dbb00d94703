use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct User {
    pub id: i32,
    pub oauth_id: String,
    pub name: String,
    pub oauth_provider: String,
    pub subdomain: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for recipe_core::User {
    fn from(user: User) -> Self {
        recipe_core::User {
            id: user.id,
            oauth_id: user.oauth_id,
            name: user.name,
            provider: user.oauth_provider,
            storage_account: user.subdomain,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub oauth_id: &'a str,
    pub name: &'a str,
    pub oauth_provider: &'a str,
    pub subdomain: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct Recipe {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<Recipe> for recipe_core::StoredRecipe {
    fn from(recipe: Recipe) -> Self {
        recipe_core::StoredRecipe {
            id: recipe.id,
            user_id: recipe.user_id,
            name: recipe.title,
            content: recipe.content,
            category: recipe.category,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub user_id: i32,
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChanges<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}
