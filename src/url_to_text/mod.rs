pub mod amp;
pub mod fetchers;
pub mod html;
