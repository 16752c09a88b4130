use super::catalog::{DietaryInfo, KitchenCatalog};
use crate::error::Result;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use chefbot_core::{Context, ToolDefinition, ToolParameter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub struct CheckDietaryInfoTool {
    def: ToolDefinition,
    catalog: Arc<KitchenCatalog>,
}

impl CheckDietaryInfoTool {
    pub fn new(catalog: Arc<KitchenCatalog>) -> Self {
        let def = ToolDefinition::new(
            "check_dietary_info",
            "Return nutritional + allergen info for a given ingredient (simulated).",
        )
        .with_required_param(
            "ingredient",
            ToolParameter::string()
                .with_description("Ingredient name, e.g. 'arachide', 'œufs', 'lait', 'tofu'"),
        );
        Self { def, catalog }
    }
}

#[derive(Deserialize)]
struct DietaryInput {
    ingredient: String,
}

#[derive(Serialize)]
struct DietaryReport<'a> {
    /// Echoes the caller's spelling.
    ingredient: &'a str,
    #[serde(flatten)]
    info: DietaryInfo,
}

#[async_trait]
impl Tool for CheckDietaryInfoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, _ctx: &Context, input: Value) -> Result<ToolOutput> {
        let input: DietaryInput = serde_json::from_value(input)?;
        let info = self
            .catalog
            .dietary_info(&input.ingredient)
            .cloned()
            .unwrap_or_else(DietaryInfo::unknown);
        ToolOutput::json(&DietaryReport {
            ingredient: &input.ingredient,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn check(catalog: KitchenCatalog, ingredient: &str) -> Value {
        let tool = CheckDietaryInfoTool::new(Arc::new(catalog));
        let output = tool
            .execute(&Context::new(), json!({ "ingredient": ingredient }))
            .await
            .unwrap();
        serde_json::from_str(&output.content).unwrap()
    }

    #[tokio::test]
    async fn test_known_ingredient() {
        let value = check(KitchenCatalog::weeknight(), "Œufs").await;
        assert_eq!(value["ingredient"], "Œufs");
        assert_eq!(value["allergens"], json!(["œuf"]));
        assert_eq!(value["vegan"], false);
    }

    #[tokio::test]
    async fn test_unknown_ingredient() {
        let value = check(KitchenCatalog::weeknight(), "quinoa").await;
        assert_eq!(
            value,
            json!({
                "ingredient": "quinoa",
                "allergens": [],
                "vegan": null,
                "notes": "Info non disponible (simulé)."
            })
        );
    }

    #[tokio::test]
    async fn test_dinner_party_nuts() {
        let value = check(KitchenCatalog::dinner_party(), "arachide").await;
        assert_eq!(value["allergens"], json!(["arachide", "fruits_a_coque"]));
    }
}
