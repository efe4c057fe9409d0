//! Test utilities for kizashi_models tests.
//!
//! This module provides a scripted backend that replays a fixed sequence of
//! outcomes and records when it was called.

use async_trait::async_trait;
use kizashi_core::GenerationRequest;
use kizashi_error::{FailureClass, UpstreamError};
use kizashi_interface::GenerativeBackend;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Step {
    /// Return this text.
    Reply(&'static str),
    /// Fail with this class.
    Fail(FailureClass),
    /// Sleep before replying.
    Stall(Duration),
}

/// Backend that replays steps in order and repeats the last one forever.
pub struct ScriptedBackend {
    model: &'static str,
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Instant>>,
    models_seen: Mutex<Vec<Option<String>>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(model: &'static str, steps: Vec<Step>) -> Self {
        Self {
            model,
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
            models_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn always(model: &'static str, step: Step) -> Self {
        Self::new(model, vec![step])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }

    pub fn models_seen(&self) -> Vec<Option<String>> {
        self.models_seen.lock().clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock();
        if steps.len() > 1 {
            steps.pop_front().unwrap_or(Step::Fail(FailureClass::Other))
        } else {
            steps.front().cloned().unwrap_or(Step::Fail(FailureClass::Other))
        }
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, UpstreamError> {
        self.calls.lock().push(Instant::now());
        self.models_seen.lock().push(req.model().clone());

        match self.next_step() {
            Step::Reply(text) => Ok(text.to_string()),
            Step::Fail(class) => Err(UpstreamError::new(class, format!("scripted {}", class))),
            Step::Stall(duration) => {
                tokio::time::sleep(duration).await;
                Ok("late".to_string())
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        self.model
    }
}
