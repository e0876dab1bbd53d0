use serde::Serialize;
use std::fmt;

use super::food_entry::FoodEntry;

/// Running calorie and protein sums over a set of entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub calories: u64,
    pub protein: u64,
}

impl Totals {
    pub fn from_entries(entries: &[FoodEntry]) -> Self {
        entries.iter().fold(Self::default(), |acc, entry| Self {
            calories: acc.calories + u64::from(entry.calories),
            protein: acc.protein + u64::from(entry.protein),
        })
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kcal, {} g protein", self.calories, self.protein)
    }
}
