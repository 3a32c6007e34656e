//! Shared test helpers for loop tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use thoughtloop_core::error::ProviderError;
use thoughtloop_core::message::ContentSegment;
use thoughtloop_core::provider::{ModelRequest, ModelResponse, Provider, Usage};

/// A mock provider that returns a sequence of scripted responses and
/// records every request it receives.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<ModelResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Text-only responses that each end on whatever stop sequence the
    /// request asked for.
    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(text_response(t, ""))).collect())
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        let stop = request.stop_sequences.first().cloned();
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        let next = self.responses.lock().unwrap().pop_front();
        let Some(mut response) = next.transpose()? else {
            panic!("ScriptedProvider: no more responses (call #{call})");
        };
        if response.stop_sequence.as_deref() == Some("") {
            response.stop_sequence = stop;
        }
        Ok(response)
    }
}

/// A text response that stopped on `stop`. An empty `stop` is filled in
/// with the request's first stop sequence by [`ScriptedProvider`].
pub fn text_response(text: &str, stop: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentSegment::text(text)],
        stop_reason: "stop_sequence".into(),
        stop_sequence: Some(stop.to_string()),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}
