//! Target language of generated text and the prompt wording for each.

use serde::{Deserialize, Serialize};

/// Language the model is asked to write in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    English,
    German,
}

/// Fixed prompt fragments for one locale.
#[derive(Debug)]
pub struct LocaleTemplates {
    /// System instruction describing the required Markdown structure.
    pub format_contract: &'static str,
    /// Prefix for description and voice requests.
    pub describe_task: &'static str,
    /// Prefix for the optional free-form details line.
    pub details_label: &'static str,
    /// Prefix for scraped page content.
    pub link_task: &'static str,
    /// System instruction for rewriting an existing recipe.
    pub transform_contract: &'static str,
    /// Prefix for a change request on an existing recipe.
    pub change_task: &'static str,
    /// Prefix for a plain reformat of an existing recipe.
    pub reformat_task: &'static str,
    /// System instruction for the recipe name.
    pub name_system: &'static str,
    /// Prefix for the recipe name request.
    pub name_task: &'static str,
}

static ENGLISH: LocaleTemplates = LocaleTemplates {
    format_contract: "You are an agent that changes the format of recipes. \
The recipe needs to be in markdown format:\n\
# <Recipe Name>\n\
## Ingredients\n\
- **<AMOUNT>** Ingredient\n\
## Preparation\n\
### <Instruction set, e.g. Prepare the dough>\n\
- <Steps>\n\
### <Instruction set, e.g. Bake>\n\
- <Steps>\n\
All ingredients need to be in metric units.",
    describe_task: "Generate a recipe for the following description: ",
    details_label: "Additional details: ",
    link_task: "Change to markdown format: ",
    transform_contract: "You are an agent that edits existing recipes. \
Keep the recipe in the same format and language and do not invent a different dish. \
The recipe needs to be in markdown format:\n\
# <Recipe Name>\n\
## Ingredients\n\
- **<AMOUNT>** Ingredient\n\
## Preparation\n\
### <Instruction set>\n\
- <Steps>\n\
All ingredients need to be in metric units. \
Only respond with the recipe and nothing else.",
    change_task: "Change the following recipe according to this request: ",
    reformat_task: "Reformat the following recipe: ",
    name_system: "You only respond with the recipe name. 2 words max.",
    name_task: "Generate a recipe name for: ",
};

static GERMAN: LocaleTemplates = LocaleTemplates {
    format_contract: "Du bist ein Agent, der das Format von Rezepten ändert. \
Das Rezept muss im Markdown-Format sein:\n\
# <Rezeptname>\n\
## Zutaten\n\
- **<MENGE>** Zutat\n\
## Zubereitung\n\
### <Anweisung> z.B. Teig anrühren/Vorbereitung\n\
- <Schritte>\n\
### <Anweisung> z.B. Backen/Braten\n\
- <Schritte>\n\
Alle Zutaten müssen in metrischen Einheiten angegeben werden.",
    describe_task: "Erstelle ein Rezept für folgende Beschreibung: ",
    details_label: "Zusätzliche Details: ",
    link_task: "Ändere das Rezept in Markdown-Format: ",
    transform_contract: "Du bist ein Agent, der bestehende Rezepte bearbeitet. \
Behalte Format und Sprache des Rezepts bei und erfinde kein anderes Gericht. \
Das Rezept muss im Markdown-Format sein:\n\
# <Rezeptname>\n\
## Zutaten\n\
- **<MENGE>** Zutat\n\
## Zubereitung\n\
### <Anweisung>\n\
- <Schritte>\n\
Alle Zutaten müssen in metrischen Einheiten angegeben werden. \
Antworte nur mit dem Rezept und sonst nichts.",
    change_task: "Ändere das folgende Rezept nach dieser Anweisung: ",
    reformat_task: "Formatiere das folgende Rezept: ",
    name_system: "Du bist ein Agent, der nur mit dem Rezeptnamen antwortet. Maximal 2 Wörter.",
    name_task: "Generiere einen Rezeptnamen für: ",
};

impl Locale {
    /// Map the `isGerman` request flag.
    pub fn from_is_german(is_german: bool) -> Self {
        if is_german {
            Locale::German
        } else {
            Locale::English
        }
    }

    /// Parse the `isGerman` form field, which must be exactly "true" or "false".
    pub fn parse_flag(value: &str) -> Option<Self> {
        match value {
            "true" => Some(Locale::German),
            "false" => Some(Locale::English),
            _ => None,
        }
    }

    pub fn templates(self) -> &'static LocaleTemplates {
        match self {
            Locale::English => &ENGLISH,
            Locale::German => &GERMAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_mapping() {
        assert_eq!(Locale::from_is_german(true), Locale::German);
        assert_eq!(Locale::from_is_german(false), Locale::English);
    }

    #[test]
    fn test_parse_flag_is_exact() {
        assert_eq!(Locale::parse_flag("true"), Some(Locale::German));
        assert_eq!(Locale::parse_flag("false"), Some(Locale::English));
        assert_eq!(Locale::parse_flag("TRUE"), None);
        assert_eq!(Locale::parse_flag("1"), None);
        assert_eq!(Locale::parse_flag(""), None);
    }

    #[test]
    fn test_templates_differ_per_locale() {
        let en = Locale::English.templates();
        let de = Locale::German.templates();
        assert!(en.format_contract.contains("## Ingredients"));
        assert!(de.format_contract.contains("## Zutaten"));
        assert!(en.format_contract.contains("metric units"));
        assert!(de.format_contract.contains("metrischen Einheiten"));
        assert_ne!(en.name_system, de.name_system);
    }
}
