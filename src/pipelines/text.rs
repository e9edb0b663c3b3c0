use crate::error::ImportError;
use crate::model::{Ingredient, Recipe};
use crate::parsers::{parse_freeform_instructions, parse_ingredient_line};
use log::debug;

/// Parses pasted ingredient text, one ingredient per line.
///
/// Lines that yield nothing (blank lines, section labels) are dropped.
pub fn parse_ingredient_lines(text: &str) -> Vec<Ingredient> {
    text.lines()
        .flat_map(parse_ingredient_line)
        .filter(|ingredient| !ingredient.name.trim().is_empty())
        .collect()
}

/// Parses pasted instruction text into ordered steps.
pub fn parse_instruction_text(text: &str) -> Vec<String> {
    parse_freeform_instructions(text)
        .into_iter()
        .flat_map(|section| section.steps)
        .collect()
}

/// Builds a recipe from pasted text.
pub fn recipe_from_text(
    name: &str,
    ingredients: &str,
    instructions: &str,
) -> Result<Recipe, ImportError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ImportError::MissingName);
    }

    let ingredients = parse_ingredient_lines(ingredients);
    let instructions = parse_freeform_instructions(instructions);
    debug!(
        "Pasted recipe '{}': {} ingredients, {} steps",
        name,
        ingredients.len(),
        instructions.iter().map(|s| s.steps.len()).sum::<usize>()
    );

    Ok(Recipe {
        name: name.to_string(),
        ingredients,
        instructions,
        is_custom: true,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn test_parse_ingredient_lines() {
        let text = "2 cups flour, sifted\n\nIngredients:\nsalt and pepper to taste\n1 egg";
        let ingredients = parse_ingredient_lines(text);
        let names: Vec<&str> = ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["flour", "salt", "black pepper", "egg"]);
        assert_eq!(ingredients[0].category, Category::Pantry);
    }

    #[test]
    fn test_parse_instruction_text() {
        let steps = parse_instruction_text("1. Mix\n2. Bake\n3. Cool");
        assert_eq!(steps, vec!["Mix", "Bake", "Cool"]);
        assert!(parse_instruction_text("").is_empty());
    }

    #[test]
    fn test_recipe_from_text() {
        let recipe = recipe_from_text(" Pancakes ", "1 cup milk\n1 egg", "Whisk.\nFry.").unwrap();
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.instructions[0].steps, vec!["Whisk.", "Fry."]);
        assert!(recipe.is_custom);

        assert!(matches!(
            recipe_from_text("", "1 egg", "Fry."),
            Err(ImportError::MissingName)
        ));
    }
}
