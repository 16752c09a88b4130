//! ChefBot: a French seasonal-cooking assistant built on the agent runtime.
//!
//! Every feature hangs off [`ChefBot`], which carries the provider, the
//! model names and the tracer:
//!
//! - [`ChefBot::ask_chef`]: one question to the seasonal chef
//! - [`ChefBot::plan_weekly_menu`]: plan, execute and synthesize a week of meals
//! - [`eval`]: dataset, rule checks, LLM judge and experiment runs
//! - [`ChefBot::manual_tool_calling_agent`]: the kitchen agent over fridge,
//!   recipe and dietary tools
//! - [`RestaurantWaiter`] and [`DinnerPartyTeam`]: planning and multi-agent
//!   scenarios

pub mod ask;
pub mod chefbot;
pub mod error;
pub mod eval;
pub mod kitchen_agent;
pub mod party;
pub mod planner;
pub mod prompts;
pub mod restaurant;

pub use chefbot::{ChefBot, Models};
pub use error::{KitchenError, PlannerError, Result};
pub use eval::{DatasetStore, ExperimentRun};
pub use kitchen_agent::manual_agent_question;
pub use party::DinnerPartyTeam;
pub use planner::{DayMenu, Plan, PlanStep, WeeklyMenu};
pub use restaurant::RestaurantWaiter;
