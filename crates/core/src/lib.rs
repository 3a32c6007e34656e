//! # thoughtloop Core
//!
//! Domain types, traits, and error definitions for the thoughtloop ReAct
//! agent. This crate performs **no I/O**: it defines the transcript model,
//! the model-invocation boundary, and the tool contract that every other
//! crate implements against.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ActionError, Error, ProviderError, Result, ToolError};
pub use message::{Attachment, ContentSegment, Message, Role, Transcript};
pub use provider::{GenerationSettings, ModelRequest, ModelResponse, Provider, Usage};
pub use tool::{FnTool, Tool, ToolInputs, ToolRegistry};
