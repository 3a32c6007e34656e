//! System prompt rendering.

use std::path::Path;

use thoughtloop_core::error::{Error, Result};
use thoughtloop_core::tool::ToolRegistry;

/// The built-in template. `{tools}` marks where tool documentation goes.
pub const DEFAULT_TEMPLATE: &str = include_str!("prompts/system.md");

const TOOLS_PLACEHOLDER: &str = "{tools}";

/// Substitute the registry's tool documentation into `template`.
///
/// `{{` and `}}` render as literal `{` and `}`, so a template can show
/// braces next to the placeholder. Any other brace is copied as is.
pub fn render_system_prompt(template: &str, tools: &ToolRegistry) -> String {
    substitute(template, &tools.render_prompt()).0
}

/// Expand `template`, returning the text and the number of placeholders
/// that were filled.
fn substitute(template: &str, tools: &str) -> (String, usize) {
    let mut out = String::with_capacity(template.len() + tools.len());
    let mut filled = 0;
    let mut rest = template;
    while let Some(i) = rest.find(['{', '}']) {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let consumed = if rest.starts_with("{{") {
            out.push('{');
            2
        } else if rest.starts_with("}}") {
            out.push('}');
            2
        } else if rest.starts_with(TOOLS_PLACEHOLDER) {
            out.push_str(tools);
            filled += 1;
            TOOLS_PLACEHOLDER.len()
        } else {
            out.push_str(&rest[..1]);
            1
        };
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    (out, filled)
}

/// Read a replacement template from disk.
///
/// Braces follow [`render_system_prompt`]: `{{` and `}}` are escapes, so
/// `{{tools}}` is literal text and does not count as the placeholder. A
/// template without a `{tools}` placeholder would hide every tool from
/// the model, so it is rejected.
pub fn load_template(path: &Path) -> Result<String> {
    let template = std::fs::read_to_string(path).map_err(|e| {
        Error::Internal(format!(
            "Failed to read system prompt template at {}: {e}",
            path.display()
        ))
    })?;
    if substitute(&template, "").1 == 0 {
        return Err(Error::Validation(format!(
            "system prompt template at {} has no {TOOLS_PLACEHOLDER} placeholder",
            path.display()
        )));
    }
    Ok(template)
}
