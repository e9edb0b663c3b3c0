use crate::model::Category;
use regex::Regex;
use std::sync::LazyLock;

struct CategoryRule {
    category: Category,
    pattern: Regex,
    unless: Option<Regex>,
}

impl CategoryRule {
    fn new(category: Category, pattern: &str, unless: Option<&str>) -> Self {
        Self {
            category,
            pattern: Regex::new(pattern).expect("Invalid category regex"),
            unless: unless.map(|p| Regex::new(p).expect("Invalid category exclusion regex")),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name) && !self.unless.as_ref().is_some_and(|re| re.is_match(name))
    }
}

// Proteins and dairy go before the broad pantry/produce rules.
static RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    vec![
        CategoryRule::new(
            Category::Meat,
            r"\b(chicken|beef|pork|lamb|veal|turkey|duck|bacon|ham|sausages?|chorizo|pancetta|prosciutto|salami|pepperoni|steaks?|mince|ground meat|meatballs?|ribs?|brisket|venison|thighs?|drumsticks?|tenderloin|sirloin|loin)\b",
            Some(r"\b(broth|stock|bouillon|seasoning|gravy)\b"),
        ),
        CategoryRule::new(
            Category::Seafood,
            r"\b(fish|salmon|tuna|cod|halibut|tilapia|trout|haddock|mackerel|sardines?|anchov(y|ies)|shrimps?|prawns?|crab|lobster|scallops?|mussels?|clams?|oysters?|squid|calamari|octopus)\b",
            Some(r"\b(sauce|stock|broth)\b"),
        ),
        CategoryRule::new(
            Category::Dairy,
            r"\b(milk|butter|buttermilk|cream|cheese|cheddar|mozzarella|parmesan|parmigiano|ricotta|feta|gouda|brie|mascarpone|yogh?urt|ghee|eggs?|egg (yolks?|whites?)|half-and-half|crème fraîche|creme fraiche)\b",
            Some(r"\b(peanut butter|almond butter|nut butter|cocoa butter|butternut|coconut milk|coconut cream|ice cream|cream of tartar|cream of|cream soda)\b"),
        ),
        CategoryRule::new(
            Category::Bakery,
            r"\b(bread|baguette|buns?|rolls?|tortillas?|pitas?|naan|bagels?|croissants?|brioche|ciabatta|focaccia|english muffins?|pie crust|pizza dough|breadcrumbs|panko)\b",
            None,
        ),
        CategoryRule::new(
            Category::CannedGoods,
            r"\b(canned|tinned|can of|broth|stock|bouillon|tomato paste|tomato sauce|crushed tomatoes|diced tomatoes|coconut milk|chickpeas|kidney beans|black beans|cannellini|refried beans)\b",
            None,
        ),
        CategoryRule::new(
            Category::Frozen,
            r"\b(frozen|ice cream|puff pastry|phyllo|filo)\b",
            None,
        ),
        CategoryRule::new(
            Category::Spices,
            r"\b(salt|pepper(corns?)?|cumin|paprika|cinnamon|nutmeg|cloves? ground|ground cloves|turmeric|oregano|chili powder|chilli powder|cayenne|curry powder|garam masala|coriander seeds?|ground coriander|allspice|cardamom|bay leaf|bay leaves|dried thyme|dried basil|dried rosemary|italian seasoning|seasoning|red pepper flakes|chili flakes|saffron|star anise|fennel seeds?|mustard seeds?|garlic powder|onion powder|smoked paprika|vanilla extract)\b",
            Some(r"\b(bell peppers?|red peppers?|green peppers?|yellow peppers?|jalape[nñ]os?|sweet peppers?|chil(i|li) peppers?|peppers)\b"),
        ),
        CategoryRule::new(
            Category::Pantry,
            r"\b(flour|sugar|rice|pasta|spaghetti|penne|noodles|oats|oil|vinegar|honey|maple syrup|syrup|soy sauce|sauce|baking powder|baking soda|yeast|cornstarch|cocoa|chocolate|nuts?|almonds|walnuts|pecans|peanuts|peanut butter|almond butter|lentils|quinoa|couscous|beans|cereal|crackers|mustard|ketchup|mayonnaise|mayo|jam|raisins|cornmeal|breadcrumbs|tahini|molasses|gelatin|extract)\b",
            None,
        ),
        CategoryRule::new(
            Category::Produce,
            r"\b(onions?|shallots?|garlic|tomato(es)?|potato(es)?|carrots?|celery|lettuce|spinach|kale|cabbage|broccoli|cauliflower|zucchini|courgettes?|eggplants?|aubergines?|peppers?|cucumbers?|mushrooms?|corn|peas|green beans|avocados?|lemons?|limes?|oranges?|apples?|bananas?|berries|strawberries|blueberries|raspberries|grapes|mangos?|mangoes|pineapple|peaches|pears?|ginger|herbs?|basil|parsley|cilantro|coriander|mint|dill|thyme|rosemary|sage|chives|scallions?|green onions?|leeks?|squash|pumpkin|sweet potato(es)?|beets?|radish(es)?|arugula|jalape[nñ]os?|chil(i|li)es|chil(i|li)s?)\b",
            None,
        ),
    ]
});

/// Picks a shopping category for an ingredient name.
///
/// Rules are tried in order and the first match wins; anything unmatched is
/// `Category::Other`.
pub fn categorize(name: &str) -> Category {
    let name = name.trim().to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&name))
        .map(|rule| rule.category)
        .unwrap_or_default()
}
