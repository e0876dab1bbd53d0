use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A food entry represents one logged food consumption event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: Uuid,
    pub name: String,
    pub calories: u32,
    pub protein: u32,
}

impl FoodEntry {
    pub fn new(name: impl Into<String>, calories: u32, protein: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories,
            protein,
        }
    }
}

impl fmt::Display for FoodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} kcal, {} g protein",
            self.name, self.calories, self.protein
        )
    }
}
