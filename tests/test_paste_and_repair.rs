use recipe_ingest::{
    fix_ingredient_data, parse_ingredient_lines, parse_instruction_text, recipe_from_text,
    Category, Ingredient, PlanItem, Recipe,
};
use serde_json::json;

#[test]
fn test_pasted_ingredient_list() {
    let pasted = "\
Ingredients:
• 2 cups flour, sifted
• 1 1/2 tsp baking powder
• ½ cup sugar
• 200g / 7oz butter, softened
• 2 large eggs
• salt and pepper to taste
• fresh parsley (optional)
Other: lime wedges for serving
";
    let ingredients = parse_ingredient_lines(pasted);
    let names: Vec<&str> = ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "flour",
            "baking powder",
            "sugar",
            "butter",
            "eggs",
            "salt",
            "black pepper",
            "fresh parsley"
        ]
    );

    assert_eq!(ingredients[0].preparation, "sifted");
    assert_eq!(ingredients[1].quantity, Some(1.5));
    assert_eq!(ingredients[2].quantity, Some(0.5));
    assert_eq!(ingredients[3].unit, "g");
    assert_eq!(ingredients[3].category, Category::Dairy);
    assert!(ingredients[7].optional);
}

#[test]
fn test_pasted_instructions() {
    let steps = parse_instruction_text("1. Preheat the oven.\n2. Mix.\n\n3. Bake for 20 minutes.");
    assert_eq!(steps, vec!["Preheat the oven.", "Mix.", "Bake for 20 minutes."]);
}

#[test]
fn test_pasted_recipe_serializes_like_an_import() {
    let recipe = recipe_from_text("Quick Bread", "2 cups flour\n1 cup milk", "Mix.\nBake.").unwrap();
    let json = serde_json::to_value(&recipe).unwrap();
    assert_eq!(json["name"], "Quick Bread");
    assert_eq!(json["isCustom"], true);
    assert_eq!(json["ingredients"][0]["category"], "pantry");
    assert_eq!(json["ingredients"][1]["category"], "dairy");
    assert_eq!(json["instructions"][0]["section"], "Instructions");
}

#[test]
fn test_repair_saved_data_is_idempotent() {
    let saved: Recipe = serde_json::from_value(json!({
        "name": "Old Import",
        "ingredients": [
            {"name": "2 cups flour", "quantity": null, "unit": "", "category": "other"},
            {"name": "3 cloves garlic, minced", "quantity": 0, "unit": "as needed"},
            {"name": "salt", "quantity": 0, "unit": "", "preparation": "to taste", "category": "spices"},
            {"name": "eggs", "quantity": 2, "unit": ""}
        ]
    }))
    .unwrap();
    let plan: Vec<PlanItem> = serde_json::from_value(json!([
        {"id": "a", "date": "2026-10-12", "recipe": saved.clone()},
        {"id": "b", "note": "eat out"}
    ]))
    .unwrap();

    let first = fix_ingredient_data(&[saved.clone()], &plan);
    assert_eq!(first.ingredients_fixed, 4);

    let fixed: &[Ingredient] = &first.fixed_recipes[0].ingredients;
    assert_eq!(fixed[0].name, "flour");
    assert_eq!(fixed[1].name, "garlic");
    assert_eq!(fixed[1].unit, "cloves");
    assert_eq!(fixed[1].preparation, "minced");
    assert_eq!(fixed[2], saved.ingredients[2]);
    assert_eq!(fixed[3], saved.ingredients[3]);

    let plan_json = serde_json::to_value(&first.fixed_plan).unwrap();
    assert_eq!(plan_json[0]["date"], "2026-10-12");
    assert_eq!(plan_json[1]["note"], "eat out");

    let second = fix_ingredient_data(&first.fixed_recipes, &first.fixed_plan);
    assert_eq!(second.ingredients_fixed, 0);
    assert_eq!(second.fixed_recipes, first.fixed_recipes);
}
