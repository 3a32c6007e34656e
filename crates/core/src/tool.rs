//! Tool trait: the abstraction over the actions the model may request.
//!
//! A tool is a named, string-in/string-out function with a description and
//! an explicitly declared parameter list. The [`ToolRegistry`] renders tool
//! documentation for the system prompt and resolves incoming actions by
//! exact name.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::ToolError;

/// Named string inputs for a tool call, in document order.
///
/// Names are unique. Inserting a name that is already present replaces its
/// value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInputs {
    entries: Vec<(String, String)>,
}

impl ToolInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of the input with this name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), but a missing input is an error.
    pub fn require(&self, name: &str) -> Result<&str, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing input <{name}>")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ToolInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inputs = Self::new();
        for (k, v) in iter {
            inputs.insert(k, v);
        }
        inputs
    }
}

/// The core Tool trait.
///
/// Tools are constructed once at startup and shared read-only. Invocation
/// is synchronous; numeric parsing and its failure modes belong to the
/// tool, not to the dispatcher.
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "Add").
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the model).
    fn description(&self) -> &str;

    /// Declared parameter names, in the order they are documented.
    fn parameters(&self) -> &[&str];

    /// Run the tool.
    fn invoke(&self, inputs: &ToolInputs) -> Result<String, ToolError>;

    /// Documentation block for the system prompt: name, description, and
    /// an invocation skeleton listing every declared parameter.
    fn prompt(&self) -> String {
        let inputs: String = self
            .parameters()
            .iter()
            .map(|p| format!("<{p}>Parameter input</{p}>"))
            .collect();
        format!(
            "\n### {name}\n\n{description}\n\n```xml\n<Action>\n    <Name>{name}</Name>\n    <Inputs>{inputs}</Inputs>\n</Action>\n```\n",
            name = self.name(),
            description = self.description(),
        )
    }
}

type ToolFn = dyn Fn(&ToolInputs) -> Result<String, ToolError> + Send + Sync;

/// A tool backed by a closure.
pub struct FnTool {
    name: String,
    description: String,
    parameters: Vec<&'static str>,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &[&'static str],
        func: F,
    ) -> Self
    where
        F: Fn(&ToolInputs) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters.to_vec(),
            func: Box::new(func),
        }
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[&str] {
        &self.parameters
    }

    fn invoke(&self, inputs: &ToolInputs) -> Result<String, ToolError> {
        (self.func)(inputs)
    }
}

/// An immutable, name-keyed set of tools.
///
/// Registration order is kept for prompt rendering. When two tools share a
/// name the first one wins and the later one is dropped.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::default();
        for tool in tools {
            let name = tool.name().to_string();
            if registry.index.contains_key(&name) {
                warn!(tool = %name, "Duplicate tool name, keeping the first registration");
                continue;
            }
            registry.index.insert(name, registry.tools.len());
            registry.tools.push(tool);
        }
        registry
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn lookup(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Prompt blocks for every tool, newline-joined, in registration order.
    pub fn render_prompt(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.prompt())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// List all registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
