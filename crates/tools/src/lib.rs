//! Built-in tool implementations for thoughtloop.
//!
//! The default tool set is integer arithmetic: enough for the model to
//! work through expressions one operation at a time.

pub mod arithmetic;

use std::sync::Arc;

use thoughtloop_core::tool::{Tool, ToolRegistry};
use tracing::debug;

pub use arithmetic::{ArithmeticTool, Operation};

/// Create a registry with all built-in tools, in documentation order.
pub fn default_registry() -> ToolRegistry {
    let tools: Vec<Arc<dyn Tool>> = Operation::ALL
        .iter()
        .map(|&op| Arc::new(ArithmeticTool::new(op)) as Arc<dyn Tool>)
        .collect();
    debug!(count = tools.len(), "Registering built-in tools");
    ToolRegistry::new(tools)
}
