//! The simulated kitchen: data catalog and the tools agents call.

mod calculate;
mod catalog;
mod dietary;
mod fridge;
mod menu;
mod recipe;

pub use calculate::{evaluate, CalculateTool, INVALID_EXPRESSION};
pub use catalog::{DietaryInfo, Dish, KitchenCatalog, Recipe, ALLERGENS, CATEGORIES, TAGS};
pub use dietary::CheckDietaryInfoTool;
pub use fridge::CheckFridgeTool;
pub use menu::{MenuDatabaseTool, MenuQuery};
pub use recipe::GetRecipeTool;

use crate::error::Result;
use crate::registry::ToolRegistry;
use crate::traits::Tool;
use std::sync::Arc;

/// `check_fridge`, `get_recipe` and `check_dietary_info` over one catalog.
pub fn cooking_registry(catalog: Arc<KitchenCatalog>) -> Result<ToolRegistry> {
    ToolRegistry::from_tools([
        Arc::new(CheckFridgeTool::new(catalog.clone())) as Arc<dyn Tool>,
        Arc::new(GetRecipeTool::new(catalog.clone())),
        Arc::new(CheckDietaryInfoTool::new(catalog)),
    ])
}

/// `menu_database` and `calculate`.
pub fn restaurant_registry(catalog: Arc<KitchenCatalog>) -> Result<ToolRegistry> {
    ToolRegistry::from_tools([
        Arc::new(MenuDatabaseTool::new(catalog)) as Arc<dyn Tool>,
        Arc::new(CalculateTool::new()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registries() {
        let catalog = Arc::new(KitchenCatalog::weeknight());
        let cooking = cooking_registry(catalog.clone()).unwrap();
        assert_eq!(cooking.list(), ["check_dietary_info", "check_fridge", "get_recipe"]);

        let restaurant = restaurant_registry(catalog).unwrap();
        assert_eq!(restaurant.list(), ["calculate", "menu_database"]);
    }
}
