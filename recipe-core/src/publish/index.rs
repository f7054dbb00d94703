//! Categorized index document and recipe file paths.

use crate::postprocess::Category;
use crate::store::StoredRecipe;

/// Path of the index document inside a site.
pub const INDEX_PATH: &str = "recipes.md";

const INDEX_TITLE: &str = "# Rezepte\n\n";

/// Section headings in output order.
const SECTIONS: [(Category, &str); 5] = [
    (Category::MainCourse, "🍝 Hauptgerichte"),
    (Category::Starter, "🥗 Vorspeisen"),
    (Category::Dessert, "🧁 Desserts"),
    (Category::Bread, "🍞 Brot"),
    (Category::Misc, "🍴 Sonstiges"),
];

/// Recipe name as used in URLs and file names.
pub fn recipe_slug(name: &str) -> String {
    name.replace(' ', "-")
}

/// Path of a recipe's Markdown file inside a site.
pub fn recipe_path(name: &str) -> String {
    format!("recipes/{}.md", recipe_slug(name))
}

/// Render the index of all recipes, grouped by stored category label.
/// Labels outside the known set land in the misc section.
pub fn render_index(recipes: &[StoredRecipe]) -> String {
    let mut out = String::from(INDEX_TITLE);
    for (i, (category, heading)) in SECTIONS.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(heading);
        out.push('\n');
        for recipe in recipes
            .iter()
            .filter(|r| Category::from_label(&r.category) == *category)
        {
            out.push_str(&format!(
                "- [{}](/?recipe={})\n",
                recipe.name,
                recipe_slug(&recipe.name)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: i32, name: &str, category: &str) -> StoredRecipe {
        StoredRecipe {
            id,
            user_id: 1,
            name: name.to_string(),
            content: String::new(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_recipe_path() {
        assert_eq!(recipe_path("Tomato Soup"), "recipes/Tomato-Soup.md");
        assert_eq!(recipe_path("Brot"), "recipes/Brot.md");
    }

    #[test]
    fn test_empty_index() {
        assert_eq!(
            render_index(&[]),
            "# Rezepte\n\n🍝 Hauptgerichte\n\n🥗 Vorspeisen\n\n🧁 Desserts\n\n🍞 Brot\n\n🍴 Sonstiges\n"
        );
    }

    #[test]
    fn test_index_groups_by_category() {
        let recipes = vec![
            recipe(1, "Tomato Soup", "Vorspeise"),
            recipe(2, "Lasagne", "Hauptgericht"),
            recipe(3, "Sauerteig Brot", "Brot"),
            recipe(4, "Tiramisu", "Dessert"),
            recipe(5, "Limonade", "Getränk"),
            recipe(6, "Gulasch", "Hauptgericht"),
        ];
        let expected = "# Rezepte\n\n\
🍝 Hauptgerichte\n\
- [Lasagne](/?recipe=Lasagne)\n\
- [Gulasch](/?recipe=Gulasch)\n\
\n🥗 Vorspeisen\n\
- [Tomato Soup](/?recipe=Tomato-Soup)\n\
\n🧁 Desserts\n\
- [Tiramisu](/?recipe=Tiramisu)\n\
\n🍞 Brot\n\
- [Sauerteig Brot](/?recipe=Sauerteig-Brot)\n\
\n🍴 Sonstiges\n\
- [Limonade](/?recipe=Limonade)\n";
        assert_eq!(render_index(&recipes), expected);
    }

    #[test]
    fn test_index_category_match_is_exact() {
        let recipes = vec![recipe(1, "Pie", "Dessert-ish")];
        assert!(render_index(&recipes).ends_with("🍴 Sonstiges\n- [Pie](/?recipe=Pie)\n"));
    }
}
