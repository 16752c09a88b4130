pub mod error;
pub mod executor;
#[cfg(feature = "kitchen")]
pub mod kitchen;
pub mod registry;
pub mod traits;

pub use error::{Result, ToolError};
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolOutput};

#[cfg(feature = "kitchen")]
pub use kitchen::{
    CalculateTool, CheckDietaryInfoTool, CheckFridgeTool, GetRecipeTool, KitchenCatalog,
    MenuDatabaseTool,
};

pub mod prelude {
    pub use crate::error::{Result, ToolError};
    pub use crate::executor::ToolExecutor;
    pub use crate::registry::ToolRegistry;
    pub use crate::traits::{Tool, ToolOutput};

    #[cfg(feature = "kitchen")]
    pub use crate::kitchen::{
        CalculateTool, CheckDietaryInfoTool, CheckFridgeTool, GetRecipeTool, KitchenCatalog,
        MenuDatabaseTool,
    };
}
