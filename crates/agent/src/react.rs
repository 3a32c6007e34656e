//! ReAct loop controller: Thoughts → Action → Observation.
//!
//! Each turn asks the model for one `<Thoughts>` block and one `<Action>`
//! block. A `FinalAnswer` action ends the run; any other action is
//! dispatched to the tool registry and its result is fed back as an
//! `<Observation>` user turn. The run also ends, without an answer, once
//! the turn budget is spent.
//!
//! Every error aborts the run. There is no retry and no re-prompting.

use std::sync::Arc;

use thoughtloop_core::error::Result;
use thoughtloop_core::message::{Message, Transcript};
use thoughtloop_core::provider::{GenerationSettings, Provider};
use thoughtloop_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::action::{final_answer_tool, invoke_action, is_final_answer, observation};
use crate::generation::{Tag, generate_tagged};
use crate::trace::{TraceEntry, TraceKind};

/// Answer reported when the turn budget runs out.
pub const LOOP_ENDED: &str = "Loop ended";

/// The ReAct loop and everything it needs for a run.
pub struct ReactLoop {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Model name and sampling parameters, fixed for the run.
    settings: GenerationSettings,
    /// Tools the model may call.
    tools: Arc<ToolRegistry>,
    /// Holds only the FinalAnswer sentinel.
    finisher: ToolRegistry,
    /// Maximum Thoughts/Action/Observation cycles.
    max_turns: u32,
}

/// The result of a loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The sentinel's output, or [`LOOP_ENDED`].
    pub answer: String,
    /// The transcript as it stood when the loop stopped.
    pub transcript: Transcript,
    /// Turns started, including the one that produced the answer.
    pub turns: u32,
    /// Whether a FinalAnswer action ended the run.
    pub finished: bool,
    /// Every artifact produced, in order.
    pub trace: Vec<TraceEntry>,
}

impl LoopOutcome {
    pub fn into_parts(self) -> (String, Transcript) {
        (self.answer, self.transcript)
    }
}

/// Collects trace entries and forwards each one to the observer.
struct Recorder<F> {
    trace: Vec<TraceEntry>,
    observer: F,
}

impl<F: FnMut(&TraceEntry)> Recorder<F> {
    fn record(&mut self, kind: TraceKind, content: &str) {
        let entry = TraceEntry::new(kind, content);
        (self.observer)(&entry);
        self.trace.push(entry);
    }
}

impl ReactLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: GenerationSettings,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            settings,
            tools,
            finisher: ToolRegistry::new(vec![Arc::new(final_answer_tool())]),
            max_turns: 10,
        }
    }

    /// Set max turns.
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Run the loop from an initial transcript (system prompt + problem).
    pub async fn run(&self, transcript: Transcript) -> Result<LoopOutcome> {
        self.run_with_observer(transcript, |_| {}).await
    }

    /// Run the loop, calling `observer` as each artifact is produced.
    pub async fn run_with_observer<F>(
        &self,
        mut transcript: Transcript,
        observer: F,
    ) -> Result<LoopOutcome>
    where
        F: FnMut(&TraceEntry),
    {
        let mut recorder = Recorder {
            trace: Vec::new(),
            observer,
        };
        let provider = self.provider.as_ref();

        info!(
            provider = provider.name(),
            model = %self.settings.model,
            max_turns = self.max_turns,
            "ReAct loop starting"
        );

        for turn in 1..=self.max_turns {
            debug!(turn, "ReAct turn");

            let (thoughts, next) =
                generate_tagged(provider, &self.settings, transcript, Tag::Thoughts).await?;
            recorder.record(TraceKind::Thought, &thoughts);

            let (action, next) = generate_tagged(provider, &self.settings, next, Tag::Action).await?;
            transcript = next;
            recorder.record(TraceKind::Action, &action);

            if is_final_answer(&action)? {
                let answer = invoke_action(&action, &self.finisher)?;
                recorder.record(TraceKind::FinalAnswer, &answer);
                info!(turns = turn, "ReAct loop completed");
                return Ok(LoopOutcome {
                    answer,
                    transcript,
                    turns: turn,
                    finished: true,
                    trace: recorder.trace,
                });
            }

            let result = invoke_action(&action, &self.tools)?;
            let observed = observation(&result);
            transcript = transcript.append(Message::user(observed.as_str()));
            recorder.record(TraceKind::Observation, &observed);
        }

        warn!(max_turns = self.max_turns, "ReAct loop ended without a final answer");
        Ok(LoopOutcome {
            answer: LOOP_ENDED.to_string(),
            transcript,
            turns: self.max_turns,
            finished: false,
            trace: recorder.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use thoughtloop_core::error::{ActionError, Error, ToolError};
    use thoughtloop_core::message::Role;
    use thoughtloop_core::tool::{FnTool, Tool};

    const ADD_ONE_TWO: &str = "<Name>Add</Name><Inputs><a>1</a><b>2</b></Inputs>";
    const ANSWER_42: &str = "<Name>FinalAnswer</Name><Inputs><Result>42</Result></Inputs>";

    /// An `Add` tool that counts its invocations.
    fn counting_registry() -> (Arc<ToolRegistry>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let add: Arc<dyn Tool> = Arc::new(FnTool::new(
            "Add",
            "Add two numbers",
            &["a", "b"],
            move |inputs| {
                counter.fetch_add(1, Ordering::SeqCst);
                let a: i64 = inputs.require("a")?.trim().parse().unwrap();
                let b: i64 = inputs.require("b")?.trim().parse().unwrap();
                Ok((a + b).to_string())
            },
        ));
        (Arc::new(ToolRegistry::new(vec![add])), calls)
    }

    fn setup(script: &[&str]) -> (ReactLoop, Arc<ScriptedProvider>, Arc<AtomicUsize>) {
        let provider = Arc::new(ScriptedProvider::from_texts(script));
        let (tools, calls) = counting_registry();
        let react = ReactLoop::new(provider.clone(), GenerationSettings::new("test-model"), tools);
        (react, provider, calls)
    }

    fn start() -> Transcript {
        Transcript::from_prompt("Rules", "Solve: 1 + 2")
    }

    #[test]
    fn default_max_turns() {
        let (react, _, _) = setup(&[]);
        assert_eq!(react.max_turns(), 10);
        assert_eq!(react.with_max_turns(3).max_turns(), 3);
    }

    #[tokio::test]
    async fn final_answer_on_first_turn() {
        let (react, provider, calls) = setup(&["I know this.", ANSWER_42]);

        let outcome = react.run(start()).await.unwrap();

        assert_eq!(outcome.answer, "\nFinal answer is:-\n42");
        assert!(outcome.finished);
        assert_eq!(outcome.turns, 1);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.transcript.last().unwrap().role, Role::Assistant);
        assert!(
            !outcome
                .transcript
                .messages()
                .iter()
                .any(|m| m.joined_text().contains("<Observation>"))
        );
    }

    #[tokio::test]
    async fn exhaustion_after_max_turns() {
        let script = [
            "step", ADD_ONE_TWO, "step", ADD_ONE_TWO, "step", ADD_ONE_TWO,
        ];
        let (react, provider, calls) = setup(&script);
        let react = react.with_max_turns(3);

        let outcome = react.run(start()).await.unwrap();

        assert_eq!(outcome.answer, LOOP_ENDED);
        assert!(!outcome.finished);
        assert_eq!(outcome.turns, 3);
        assert_eq!(provider.call_count(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let observations: Vec<_> = outcome
            .transcript
            .messages()
            .iter()
            .filter(|m| m.role == Role::User && m.joined_text() == "<Observation>3</Observation>\n")
            .collect();
        assert_eq!(observations.len(), 3);
        assert_eq!(outcome.trace.len(), 9);
    }

    #[tokio::test]
    async fn observation_is_sent_on_the_next_turn() {
        let (react, provider, _) = setup(&["add", ADD_ONE_TWO, "done", ANSWER_42]);

        let outcome = react.run(start()).await.unwrap();
        assert_eq!(outcome.turns, 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 4);
        let thoughts_request = &requests[2];
        assert_eq!(thoughts_request.stop_sequences, vec!["</Thoughts>".to_string()]);
        let n = thoughts_request.messages.len();
        assert_eq!(
            thoughts_request.messages[n - 2].joined_text(),
            "<Observation>3</Observation>\n"
        );
        assert_eq!(thoughts_request.messages[n - 1].joined_text(), "<Thoughts>");
    }

    #[tokio::test]
    async fn observer_sees_artifacts_in_order() {
        let (react, _, _) = setup(&["add", ADD_ONE_TWO, "done", ANSWER_42]);
        let mut seen = Vec::new();

        let outcome = react
            .run_with_observer(start(), |entry| seen.push(entry.kind))
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec![
                TraceKind::Thought,
                TraceKind::Action,
                TraceKind::Observation,
                TraceKind::Thought,
                TraceKind::Action,
                TraceKind::FinalAnswer,
            ]
        );
        assert_eq!(outcome.trace.len(), seen.len());
        assert_eq!(outcome.trace[0].content, "<Thoughts>add</Thoughts>\n");
        assert_eq!(outcome.trace[2].content, "<Observation>3</Observation>\n");
    }

    #[tokio::test]
    async fn malformed_action_aborts_without_observation() {
        let (react, provider, calls) = setup(&["hmm", "<Name>Add</Name><Inputs>"]);
        let mut seen = Vec::new();

        let err = react
            .run_with_observer(start(), |entry| seen.push(entry.kind))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Action(ActionError::Malformed { .. })));
        assert_eq!(provider.call_count(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!seen.contains(&TraceKind::Observation));
    }

    #[tokio::test]
    async fn unknown_tool_aborts() {
        let (react, _, _) = setup(&[
            "hmm",
            "<Name>Modulo</Name><Inputs><a>1</a><b>2</b></Inputs>",
        ]);

        let err = react.run(start()).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::NotFound(name)) if name == "Modulo"));
    }

    #[tokio::test]
    async fn final_answer_without_result_is_rejected() {
        let (react, _, _) = setup(&["done", "<Name>FinalAnswer</Name><Inputs/>"]);

        let err = react.run(start()).await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn into_parts_returns_answer_and_transcript() {
        let (react, _, _) = setup(&["t", ANSWER_42]);
        let (answer, transcript) = react.run(start()).await.unwrap().into_parts();
        assert_eq!(answer, "\nFinal answer is:-\n42");
        assert_eq!(transcript.len(), 3);
    }
}
