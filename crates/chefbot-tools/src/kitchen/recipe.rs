use super::catalog::{KitchenCatalog, Recipe};
use crate::error::Result;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use chefbot_core::{Context, ToolDefinition, ToolParameter};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub struct GetRecipeTool {
    def: ToolDefinition,
    catalog: Arc<KitchenCatalog>,
}

impl GetRecipeTool {
    pub fn new(catalog: Arc<KitchenCatalog>) -> Self {
        let def = ToolDefinition::new(
            "get_recipe",
            "Return a detailed recipe for a given dish name (simulated).",
        )
        .with_required_param(
            "dish_name",
            ToolParameter::string()
                .with_description("Dish name, e.g. 'shakshuka' or 'curry de pois chiches'"),
        );
        Self { def, catalog }
    }
}

#[derive(Deserialize)]
struct GetRecipeInput {
    dish_name: String,
}

#[async_trait]
impl Tool for GetRecipeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
        let input: GetRecipeInput = serde_json::from_value(input)?;
        match self.catalog.recipe(&input.dish_name) {
            Some(recipe) => ToolOutput::json(recipe),
            None => Ok(ToolOutput::json(&Recipe::unavailable(&input.dish_name))?
                .with_metadata("found", false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool() -> GetRecipeTool {
        GetRecipeTool::new(Arc::new(KitchenCatalog::weeknight()))
    }

    #[tokio::test]
    async fn test_known_recipe_is_case_insensitive() {
        let output = tool()
            .execute(&Context::new(), json!({"dish_name": " Curry de Pois Chiches "}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(value["title"], "Curry de pois chiches facile");
        assert_eq!(value["time_minutes"], 20);
    }

    #[tokio::test]
    async fn test_unknown_recipe_placeholder() {
        let output = tool()
            .execute(&Context::new(), json!({"dish_name": "  Pasta Primavera "}))
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Pasta Primavera",
                "ingredients": [],
                "steps": ["Recette non disponible (simulé)."],
                "time_minutes": null
            })
        );
        assert!(!output.is_error);
    }
}
