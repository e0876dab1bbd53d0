mod food_entry;
mod totals;

pub use food_entry::FoodEntry;
pub use totals::Totals;
