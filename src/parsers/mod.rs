pub mod category;
pub mod ingredient;
pub mod instructions;
pub mod quantity;

pub use category::categorize;
pub use ingredient::parse_ingredient_line;
pub use instructions::{parse_freeform_instructions, parse_schema_instructions, InstructionItem};
pub use quantity::{normalize_fractions, parse_quantity};
