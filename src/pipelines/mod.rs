pub mod repair;
pub mod text;
pub mod url;

pub use repair::{fix_ingredient_data, RepairReport};
pub use text::{parse_ingredient_lines, parse_instruction_text, recipe_from_text};
