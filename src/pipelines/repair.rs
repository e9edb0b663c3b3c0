//! Repairs ingredients saved before the line parser understood their shape.
//!
//! Older imports sometimes stored the whole raw line as the name with no
//! quantity or unit ("2 cups flour" / none / ""). Those records are re-parsed
//! and replaced when the new parse is clearly better.

use crate::model::{Ingredient, PlanItem, Recipe};
use crate::parsers::parse_ingredient_line;
use log::{debug, info};

/// Outcome of [`fix_ingredient_data`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub fixed_recipes: Vec<Recipe>,
    pub fixed_plan: Vec<PlanItem>,
    /// Ingredients replaced across recipes and plan snapshots
    pub ingredients_fixed: usize,
}

/// Re-parses suspect ingredients in saved recipes and meal-plan snapshots.
///
/// Inputs are not modified; the report holds repaired copies. Only suspect
/// ingredients with an unambiguous better parse change, so a second run over
/// the output fixes nothing.
pub fn fix_ingredient_data(recipes: &[Recipe], plan: &[PlanItem]) -> RepairReport {
    let mut ingredients_fixed = 0;

    let fixed_recipes = recipes
        .iter()
        .map(|recipe| {
            let (fixed, count) = repair_recipe(recipe);
            ingredients_fixed += count;
            fixed
        })
        .collect();

    let fixed_plan = plan
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if let Some(recipe) = &item.recipe {
                let (fixed, count) = repair_recipe(recipe);
                ingredients_fixed += count;
                item.recipe = Some(fixed);
            }
            item
        })
        .collect();

    info!("Ingredient repair fixed {} ingredients", ingredients_fixed);
    RepairReport {
        fixed_recipes,
        fixed_plan,
        ingredients_fixed,
    }
}

fn repair_recipe(recipe: &Recipe) -> (Recipe, usize) {
    let mut fixed = recipe.clone();
    let mut count = 0;
    for ingredient in fixed.ingredients.iter_mut() {
        if let Some(better) = reparse(ingredient) {
            debug!(
                "Repaired ingredient in '{}': '{}' -> '{}'",
                recipe.name, ingredient.name, better.name
            );
            *ingredient = better;
            count += 1;
        }
    }
    (fixed, count)
}

fn is_suspect(ingredient: &Ingredient) -> bool {
    let no_quantity = ingredient.quantity.map_or(true, |q| q.abs() < 1e-9);
    let unit = ingredient.unit.trim();
    let no_unit = unit.is_empty() || unit.eq_ignore_ascii_case("as needed");
    no_quantity && no_unit
}

fn reparse(ingredient: &Ingredient) -> Option<Ingredient> {
    if !is_suspect(ingredient) {
        return None;
    }

    let mut parsed = parse_ingredient_line(&ingredient.name);
    if parsed.len() != 1 {
        return None;
    }
    let mut candidate = parsed.remove(0);
    let old_name = ingredient.name.trim();
    let improved = candidate.quantity.is_some()
        && candidate.name.len() < old_name.len()
        && candidate.name != old_name;
    if !improved {
        return None;
    }

    candidate.optional = candidate.optional || ingredient.optional;
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn raw(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity: None,
            unit: String::new(),
            preparation: String::new(),
            category: Category::Other,
            optional: false,
        }
    }

    fn recipe(ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            name: "Saved".to_string(),
            ingredients,
            ..Default::default()
        }
    }

    #[test]
    fn test_suspect_ingredients_are_reparsed() {
        let good = Ingredient {
            name: "sugar".to_string(),
            quantity: Some(1.0),
            unit: "cup".to_string(),
            preparation: String::new(),
            category: Category::Pantry,
            optional: false,
        };
        let saved = recipe(vec![raw("2 cups flour, sifted"), good.clone(), raw("basil")]);

        let report = fix_ingredient_data(&[saved.clone()], &[]);
        assert_eq!(report.ingredients_fixed, 1);

        let fixed = &report.fixed_recipes[0].ingredients;
        assert_eq!(fixed[0].name, "flour");
        assert_eq!(fixed[0].quantity, Some(2.0));
        assert_eq!(fixed[0].unit, "cups");
        assert_eq!(fixed[0].preparation, "sifted");
        assert_eq!(fixed[1], good);
        assert_eq!(fixed[2], raw("basil"));

        // input untouched
        assert_eq!(saved.ingredients[0].name, "2 cups flour, sifted");
    }

    #[test]
    fn test_canned_goods_keep_their_unit() {
        let saved = recipe(vec![raw("1 (14 oz) can diced tomatoes")]);
        let report = fix_ingredient_data(&[saved], &[]);
        let fixed = &report.fixed_recipes[0].ingredients[0];
        assert_eq!(fixed.name, "diced tomatoes");
        assert_eq!(fixed.unit, "can");
        assert_eq!(fixed.preparation, "14 oz");

        let again = fix_ingredient_data(&report.fixed_recipes, &[]);
        assert_eq!(again.ingredients_fixed, 0);
    }

    #[test]
    fn test_ambiguous_reparses_are_rejected() {
        let saved = recipe(vec![raw("salt and pepper"), raw("a handful of love")]);
        let report = fix_ingredient_data(&[saved.clone()], &[]);
        assert_eq!(report.ingredients_fixed, 0);
        assert_eq!(report.fixed_recipes[0], saved);
    }

    #[test]
    fn test_as_needed_unit_and_optional_flag() {
        let mut olive_oil = raw("3 tbsp olive oil");
        olive_oil.unit = "as needed".to_string();
        olive_oil.quantity = Some(0.0);
        olive_oil.optional = true;

        let report = fix_ingredient_data(&[recipe(vec![olive_oil])], &[]);
        let fixed = &report.fixed_recipes[0].ingredients[0];
        assert_eq!(fixed.name, "olive oil");
        assert_eq!(fixed.unit, "tbsp");
        assert!(fixed.optional);
    }

    #[test]
    fn test_plan_snapshots_and_idempotence() {
        let plan = vec![
            PlanItem {
                id: "monday".to_string(),
                recipe: Some(recipe(vec![raw("1 lb ground beef")])),
                ..Default::default()
            },
            PlanItem {
                id: "tuesday".to_string(),
                ..Default::default()
            },
        ];
        let recipes = vec![recipe(vec![raw("4 eggs"), raw("200g / 7oz butter")])];

        let first = fix_ingredient_data(&recipes, &plan);
        assert_eq!(first.ingredients_fixed, 3);
        let beef = &first.fixed_plan[0].recipe.as_ref().unwrap().ingredients[0];
        assert_eq!(beef.name, "ground beef");
        assert_eq!(beef.category, Category::Meat);
        assert!(first.fixed_plan[1].recipe.is_none());

        let second = fix_ingredient_data(&first.fixed_recipes, &first.fixed_plan);
        assert_eq!(second.ingredients_fixed, 0);
        assert_eq!(second.fixed_recipes, first.fixed_recipes);
        assert_eq!(second.fixed_plan, first.fixed_plan);
    }
}
