//! Arithmetic tools: `Multiply`, `Add`, `Subtract`, `Divide`, `Power`, `Log`.
//!
//! Every tool takes two string inputs, `a` and `b`, parses them as signed
//! 64-bit integers, and returns its result as a decimal string. Parse
//! failures, overflow, and undefined operations are tool errors.

use thoughtloop_core::error::ToolError;
use thoughtloop_core::tool::{Tool, ToolInputs};

const PARAMETERS: &[&str] = &["a", "b"];

/// The binary operation a tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Multiply,
    Add,
    Subtract,
    /// Floor division, rounding toward negative infinity.
    Divide,
    /// Integer power; a negative exponent yields a float.
    Power,
    /// Logarithm of `a` in base `b`, as a float.
    Log,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Multiply,
        Operation::Add,
        Operation::Subtract,
        Operation::Divide,
        Operation::Power,
        Operation::Log,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Multiply => "Multiply",
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Divide => "Divide",
            Operation::Power => "Power",
            Operation::Log => "Log",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::Multiply => "Multiply two numbers",
            Operation::Add => "Add two numbers",
            Operation::Subtract => "Subtract two numbers",
            Operation::Divide => "Divide two numbers",
            Operation::Power => "Raise a number to the power of another",
            Operation::Log => "Take the logarithm of a number",
        }
    }

    /// Apply the operation, returning the formatted result.
    pub fn apply(&self, a: i64, b: i64) -> Result<String, String> {
        match self {
            Operation::Multiply => a.checked_mul(b).map(|v| v.to_string()).ok_or_else(overflow),
            Operation::Add => a.checked_add(b).map(|v| v.to_string()).ok_or_else(overflow),
            Operation::Subtract => a.checked_sub(b).map(|v| v.to_string()).ok_or_else(overflow),
            Operation::Divide => floor_div(a, b).map(|v| v.to_string()),
            Operation::Power => power(a, b),
            Operation::Log => log(a, b).map(format_float),
        }
    }
}

fn overflow() -> String {
    "integer overflow".into()
}

fn floor_div(a: i64, b: i64) -> Result<i64, String> {
    if b == 0 {
        return Err("division by zero".into());
    }
    let q = a.checked_div(b).ok_or_else(overflow)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn power(base: i64, exp: i64) -> Result<String, String> {
    if exp < 0 {
        if base == 0 {
            return Err("zero cannot be raised to a negative power".into());
        }
        return Ok(format_float((base as f64).powf(exp as f64)));
    }
    let exp = u32::try_from(exp).map_err(|_| "exponent too large".to_string())?;
    base.checked_pow(exp).map(|v| v.to_string()).ok_or_else(overflow)
}

fn log(value: i64, base: i64) -> Result<f64, String> {
    if value <= 0 {
        return Err("logarithm of a non-positive number is undefined".into());
    }
    if base <= 0 || base == 1 {
        return Err(format!("invalid logarithm base {base}"));
    }
    Ok((value as f64).ln() / (base as f64).ln())
}

/// Floats always carry a decimal point (`3.0`, not `3`).
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn parse_integer(tool: &str, name: &str, raw: &str) -> Result<i64, ToolError> {
    raw.trim().parse().map_err(|_| ToolError::ExecutionFailed {
        tool_name: tool.to_string(),
        reason: format!("invalid integer for <{name}>: {raw:?}"),
    })
}

/// A two-argument integer tool.
pub struct ArithmeticTool {
    op: Operation,
}

impl ArithmeticTool {
    pub fn new(op: Operation) -> Self {
        Self { op }
    }
}

impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters(&self) -> &[&str] {
        PARAMETERS
    }

    fn invoke(&self, inputs: &ToolInputs) -> Result<String, ToolError> {
        let a = parse_integer(self.name(), "a", inputs.require("a")?)?;
        let b = parse_integer(self.name(), "b", inputs.require("b")?)?;
        self.op.apply(a, b).map_err(|reason| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
