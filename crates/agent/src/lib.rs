//! The ReAct loop: the heart of thoughtloop.
//!
//! The loop follows a **Thoughts → Action → Observation** cycle:
//!
//! 1. **Think**: prefill `<Thoughts>` and let the model write until `</Thoughts>`
//! 2. **Act**: prefill `<Action>` and let the model write until `</Action>`
//! 3. **Dispatch**: parse the action XML and run the named tool
//! 4. **Observe**: feed the result back as `<Observation>...</Observation>`
//!
//! The loop ends when the model calls `FinalAnswer` or the turn budget is
//! spent.

pub mod action;
pub mod generation;
pub mod prompt;
pub mod react;
pub mod trace;

pub use action::{
    ActionRequest, FINAL_ANSWER, final_answer_tool, invoke_action, is_final_answer, observation,
    parse_action,
};
pub use generation::{Tag, generate_tagged};
pub use prompt::{DEFAULT_TEMPLATE, load_template, render_system_prompt};
pub use react::{LOOP_ENDED, LoopOutcome, ReactLoop};
pub use trace::{TraceEntry, TraceKind};

#[cfg(test)]
pub(crate) mod test_helpers;
