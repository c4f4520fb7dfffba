pub mod database;
pub mod dispatcher;
pub mod tool;

pub use database::{ModelDatabase, ModelTransaction, ToolDatabase};
pub use dispatcher::Dispatcher;
pub use tool::{EstimationTool, ParamSpec, Tool};
