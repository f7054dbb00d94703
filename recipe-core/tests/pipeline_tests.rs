//! End-to-end pipeline ordering against the fake AI client.

use std::sync::Arc;

use recipe_core::ai::prompts::Locale;
use recipe_core::ai::{FakeAiClient, Role};
use recipe_core::publish::{publish_index, publish_recipe, MemoryPublisher, INDEX_PATH};
use recipe_core::{
    GenerateError, GenerationRequest, MemoryStore, MockFetcher, NewUser, Payload, RecipeDraft,
    RecipeGenerator, RecipeStore,
};

fn generator(ai: Arc<FakeAiClient>) -> RecipeGenerator {
    RecipeGenerator::new(ai, Arc::new(MockFetcher::new()), true)
}

#[tokio::test]
async fn test_tomato_soup_english() {
    let ai = Arc::new(FakeAiClient::with_recipe_responses());
    let request = GenerationRequest::new(
        Payload::Description {
            text: "tomato soup".to_string(),
            details: None,
        },
        Locale::from_is_german(false),
    );
    generator(ai.clone()).generate(request).await.unwrap();

    let generation = ai
        .calls()
        .into_iter()
        .find(|c| c.prompt_name == "generate_description")
        .unwrap();
    let messages = &generation.request.messages;
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(
        messages[0].content,
        Locale::English.templates().format_contract
    );
    assert_eq!(
        messages[1].content,
        "Generate a recipe for the following description: tomato soup"
    );
}

#[tokio::test]
async fn test_off_topic_input_never_reaches_generation() {
    let ai = Arc::new(FakeAiClient::new());
    ai.add_response("judge", "No.");
    let request = GenerationRequest::new(
        Payload::Description {
            text: "my car won't start".to_string(),
            details: None,
        },
        Locale::English,
    );
    let err = generator(ai.clone()).generate(request).await.unwrap_err();
    assert!(matches!(err, GenerateError::Rejected));
    assert_eq!(ai.prompt_names(), vec!["judge"]);
}

#[tokio::test]
async fn test_generate_persist_publish() {
    let ai = Arc::new(FakeAiClient::with_recipe_responses());
    let store = MemoryStore::new();
    let publisher = MemoryPublisher::new();
    let user = store
        .create_user(NewUser {
            oauth_id: "principal-1".to_string(),
            name: "Test".to_string(),
            provider: "github".to_string(),
            storage_account: "k3x9q2ab".to_string(),
        })
        .await
        .unwrap();

    let recipe = generator(ai)
        .generate(GenerationRequest::new(
            Payload::Description {
                text: "tomato soup".to_string(),
                details: None,
            },
            Locale::English,
        ))
        .await
        .unwrap();

    store
        .insert_recipe(
            user.id,
            RecipeDraft {
                name: recipe.name.clone(),
                content: recipe.body.clone(),
                category: recipe.category.clone(),
            },
        )
        .await
        .unwrap();
    publish_recipe(&publisher, &user.storage_account, &recipe.name, &recipe.body)
        .await
        .unwrap();
    publish_index(&publisher, &store, &user).await.unwrap();

    assert_eq!(
        publisher.get("k3x9q2ab", "recipes/Tomato-Soup.md"),
        Some(recipe.body)
    );
    let index = publisher.get("k3x9q2ab", INDEX_PATH).unwrap();
    assert!(index.contains("🥗 Vorspeisen\n- [Tomato Soup](/?recipe=Tomato-Soup)\n"));
}
