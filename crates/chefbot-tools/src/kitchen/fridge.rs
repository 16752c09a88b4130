use super::catalog::KitchenCatalog;
use crate::error::Result;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use chefbot_core::{Context, ToolDefinition};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct CheckFridgeTool {
    def: ToolDefinition,
    catalog: Arc<KitchenCatalog>,
}

impl CheckFridgeTool {
    pub fn new(catalog: Arc<KitchenCatalog>) -> Self {
        let def = ToolDefinition::new(
            "check_fridge",
            "Return the list of ingredients currently available in the fridge (simulated).",
        );
        Self { def, catalog }
    }
}

#[async_trait]
impl Tool for CheckFridgeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, _ctx: &Context, _input: Value) -> Result<ToolOutput> {
        ToolOutput::json(&json!({ "available": self.catalog.fridge }))
    }
}
