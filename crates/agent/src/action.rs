//! Action dispatch: turn a model-written `<Action>` block into a tool call.
//!
//! An action payload looks like:
//!
//! ```xml
//! <Action>
//!     <Name>Add</Name>
//!     <Inputs><a>2</a><b>3</b></Inputs>
//! </Action>
//! ```
//!
//! Each child element of `<Inputs>` becomes one named string input. When a
//! name repeats, the last value wins. Values are passed through untouched;
//! parsing them is the tool's job. Inputs the tool does not declare are
//! rejected before it runs.

use roxmltree::{Document, Node};
use thoughtloop_core::error::{ActionError, Result, ToolError};
use thoughtloop_core::tool::{FnTool, ToolInputs, ToolRegistry};
use tracing::debug;

use crate::generation::Tag;

/// Name of the sentinel action that ends the loop.
pub const FINAL_ANSWER: &str = "FinalAnswer";

/// A parsed action: which tool, with which inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub name: String,
    pub inputs: ToolInputs,
}

/// Parse an action payload.
///
/// Surrounding whitespace is ignored, the root element must be `<Action>`,
/// and both `<Name>` and `<Inputs>` must be present. An empty input
/// element yields an empty string.
pub fn parse_action(xml: &str) -> std::result::Result<ActionRequest, ActionError> {
    let doc = Document::parse(xml.trim()).map_err(|e| ActionError::Malformed {
        reason: e.to_string(),
    })?;

    let root = doc.root_element();
    if !root.has_tag_name(Tag::Action.name()) {
        return Err(ActionError::Malformed {
            reason: format!(
                "expected <{}> root element, found <{}>",
                Tag::Action,
                root.tag_name().name()
            ),
        });
    }

    let name = child(root, "Name")
        .ok_or(ActionError::MissingElement { element: "Name" })?
        .text()
        .unwrap_or_default()
        .trim()
        .to_string();

    let inputs = child(root, "Inputs")
        .ok_or(ActionError::MissingElement { element: "Inputs" })?
        .children()
        .filter(Node::is_element)
        .map(|input| (input.tag_name().name(), input.text().unwrap_or_default()))
        .collect();

    Ok(ActionRequest { name, inputs })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.has_tag_name(name))
}

/// Parse an action payload and run the named tool from `tools`.
pub fn invoke_action(xml: &str, tools: &ToolRegistry) -> Result<String> {
    let action = parse_action(xml)?;
    let tool = tools.lookup(&action.name)?;
    let declared = tool.parameters();
    if let Some(unknown) = action.inputs.names().find(|n| !declared.contains(n)) {
        return Err(ToolError::InvalidArguments(format!(
            "{} does not take an input named <{unknown}>",
            action.name
        ))
        .into());
    }
    debug!(tool = %action.name, inputs = action.inputs.len(), "Invoking action");
    Ok(tool.invoke(&action.inputs)?)
}

/// Whether the payload names the [`FINAL_ANSWER`] sentinel. The match is
/// case-sensitive.
pub fn is_final_answer(xml: &str) -> std::result::Result<bool, ActionError> {
    Ok(parse_action(xml)?.name == FINAL_ANSWER)
}

/// The sentinel tool. It never sits in the model-facing registry; the
/// system prompt documents it and only the loop controller dispatches it.
pub fn final_answer_tool() -> FnTool {
    FnTool::new(
        FINAL_ANSWER,
        "Use this to return the final answer to the user once the problem is solved.",
        &["Result"],
        |inputs| {
            let result = inputs.require("Result")?;
            Ok(format!("\nFinal answer is:-\n{result}"))
        },
    )
}

/// Wrap a tool result as the next user turn.
pub fn observation(result: &str) -> String {
    Tag::Observation.wrap(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use thoughtloop_core::error::Error;
    use thoughtloop_core::tool::Tool;

    fn registry() -> ToolRegistry {
        thoughtloop_tools::default_registry()
    }

    /// The `<Action>...</Action>` skeleton inside a tool's prompt block.
    fn skeleton(prompt: &str) -> &str {
        let start = prompt.find("<Action>").unwrap();
        let end = prompt.find("</Action>").unwrap() + "</Action>".len();
        &prompt[start..end]
    }

    #[test]
    fn parse_name_and_inputs_in_order() {
        let action = parse_action(
            "\n<Action>\n    <Name>Add</Name>\n    <Inputs><b>3</b><a>2</a></Inputs>\n</Action>\n",
        )
        .unwrap();
        assert_eq!(action.name, "Add");
        assert_eq!(action.inputs.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(action.inputs.get("a"), Some("2"));
    }

    #[test]
    fn empty_input_element_is_empty_string() {
        let action =
            parse_action("<Action><Name>Echo</Name><Inputs><text/><more></more></Inputs></Action>")
                .unwrap();
        assert_eq!(action.inputs.get("text"), Some(""));
        assert_eq!(action.inputs.get("more"), Some(""));
    }

    #[test]
    fn entities_are_decoded() {
        let action =
            parse_action("<Action><Name>Echo</Name><Inputs><q>a &lt; b</q></Inputs></Action>")
                .unwrap();
        assert_eq!(action.inputs.get("q"), Some("a < b"));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let err = parse_action("<Action><Name>Add</Name><Inputs>").unwrap_err();
        assert!(matches!(err, ActionError::Malformed { .. }));
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = parse_action("<Thoughts>hm</Thoughts>").unwrap_err();
        assert!(matches!(err, ActionError::Malformed { .. }));
    }

    #[test]
    fn missing_elements_are_named() {
        let err = parse_action("<Action><Inputs/></Action>").unwrap_err();
        assert!(matches!(err, ActionError::MissingElement { element: "Name" }));

        let err = parse_action("<Action><Name>Add</Name></Action>").unwrap_err();
        assert!(matches!(err, ActionError::MissingElement { element: "Inputs" }));
    }

    #[test]
    fn invoke_add() {
        let out = invoke_action(
            "<Action><Name>Add</Name><Inputs><a>2</a><b>3</b></Inputs></Action>",
            &registry(),
        )
        .unwrap();
        assert_eq!(out, "5");
    }

    #[test]
    fn invoke_unknown_tool() {
        let err = invoke_action(
            "<Action><Name>Modulo</Name><Inputs><a>2</a><b>3</b></Inputs></Action>",
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::NotFound(name)) if name == "Modulo"));
    }

    #[test]
    fn invoke_with_unparseable_input() {
        let err = invoke_action(
            "<Action><Name>Multiply</Name><Inputs><a>x</a><b>3</b></Inputs></Action>",
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::ExecutionFailed { .. })));
    }

    #[test]
    fn repeated_input_uses_last_value() {
        let out = invoke_action(
            "<Action><Name>Add</Name><Inputs><a>1</a><b>2</b><a>10</a></Inputs></Action>",
            &registry(),
        )
        .unwrap();
        assert_eq!(out, "12");
    }

    #[test]
    fn undeclared_input_is_rejected() {
        let err = invoke_action(
            "<Action><Name>Add</Name><Inputs><a>1</a><b>2</b><c>3</c></Inputs></Action>",
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidArguments(ref msg)) if msg.contains("<c>")));
    }

    #[test]
    fn invoke_malformed_is_an_action_error() {
        let err = invoke_action("not xml at all <", &registry()).unwrap_err();
        assert!(matches!(err, Error::Action(ActionError::Malformed { .. })));
    }

    #[test]
    fn final_answer_detection_is_case_sensitive() {
        assert!(
            is_final_answer("<Action><Name>FinalAnswer</Name><Inputs><Result>1</Result></Inputs></Action>")
                .unwrap()
        );
        assert!(
            !is_final_answer("<Action><Name>finalanswer</Name><Inputs><Result>1</Result></Inputs></Action>")
                .unwrap()
        );
        assert!(
            !is_final_answer("<Action><Name>Add</Name><Inputs/></Action>").unwrap()
        );
        assert!(is_final_answer("<Action>").is_err());
    }

    #[test]
    fn final_answer_tool_formats_result() {
        let tools = ToolRegistry::new(vec![Arc::new(final_answer_tool())]);
        let out = invoke_action(
            "<Action><Name>FinalAnswer</Name><Inputs><Result>42</Result></Inputs></Action>",
            &tools,
        )
        .unwrap();
        assert_eq!(out, "\nFinal answer is:-\n42");
    }

    #[test]
    fn prompt_skeletons_parse_back_to_declared_parameters() {
        let registry = registry();
        for name in registry.names() {
            let tool = registry.get(name).unwrap();
            let prompt = tool.prompt();
            let action = parse_action(skeleton(&prompt)).unwrap();
            assert_eq!(action.name, name);
            assert_eq!(action.inputs.names().collect::<Vec<_>>(), tool.parameters());
        }

        let prompt = final_answer_tool().prompt();
        let action = parse_action(skeleton(&prompt)).unwrap();
        assert_eq!(action.name, FINAL_ANSWER);
        assert_eq!(action.inputs.get("Result"), Some("Parameter input"));
    }

    #[test]
    fn observation_wrapping() {
        assert_eq!(observation("9"), "<Observation>9</Observation>\n");
    }
}
