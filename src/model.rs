use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Shopping category an ingredient is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "protein/meat")]
    Meat,
    #[serde(rename = "protein/seafood")]
    Seafood,
    #[serde(rename = "dairy")]
    Dairy,
    #[serde(rename = "bakery")]
    Bakery,
    #[serde(rename = "canned goods")]
    CannedGoods,
    #[serde(rename = "frozen")]
    Frozen,
    #[serde(rename = "spices")]
    Spices,
    #[serde(rename = "pantry")]
    Pantry,
    #[serde(rename = "produce")]
    Produce,
    #[default]
    #[serde(rename = "other")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meat => "protein/meat",
            Category::Seafood => "protein/seafood",
            Category::Dairy => "dairy",
            Category::Bakery => "bakery",
            Category::CannedGoods => "canned goods",
            Category::Frozen => "frozen",
            Category::Spices => "spices",
            Category::Pantry => "pantry",
            Category::Produce => "produce",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Display/purchasable item only; quantity, unit and preparation are split out
    pub name: String,
    /// `None` means unspecified, which is not the same as zero
    pub quantity: Option<f64>,
    /// Empty for counted items ("2 onions")
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub preparation: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSection {
    pub section: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Servings {
    pub default: u32,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub sodium: Option<f64>,
}

impl Nutrition {
    pub fn is_empty(&self) -> bool {
        [
            self.calories,
            self.protein,
            self.carbs,
            self.fat,
            self.fiber,
            self.sugar,
            self.sodium,
        ]
        .iter()
        .all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub value: f64,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<InstructionSection>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    /// ISO-8601 durations, kept exactly as published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<Servings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

/// A meal-plan entry as stored by the application.
///
/// Only the embedded recipe snapshot is interpreted here; every other field
/// is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_serializes_to_shopping_labels() {
        assert_eq!(serde_json::to_value(Category::Meat).unwrap(), json!("protein/meat"));
        assert_eq!(
            serde_json::to_value(Category::CannedGoods).unwrap(),
            json!("canned goods")
        );
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn test_ingredient_null_quantity_is_kept() {
        let ingredient: Ingredient =
            serde_json::from_value(json!({"name": "salt", "quantity": null})).unwrap();
        assert_eq!(ingredient.quantity, None);
        assert_eq!(ingredient.unit, "");
        assert_eq!(ingredient.category, Category::Other);
    }

    #[test]
    fn test_plan_item_keeps_unknown_fields() {
        let value = json!({
            "id": "p1",
            "day": "monday",
            "recipe": {"name": "Soup", "ingredients": []}
        });
        let item: PlanItem = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(item.extra.get("day"), Some(&json!("monday")));
        assert_eq!(item.recipe.as_ref().unwrap().name, "Soup");

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["day"], "monday");
    }
}
