//! Scripted `TextCompletion` for engine tests.
//!
//! Every prompt is recorded; the reply (text, failure, delay) is chosen by a closure over
//! the prompt. Concurrency is tracked so tests can assert the batch cap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{enforce_deadline, CompletionError, TextCompletion};

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub delay: Duration,
    pub result: Result<String, CompletionError>,
}

impl Scripted {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(text.into()),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(CompletionError::Service(detail.into())),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&str) -> Scripted + Send + Sync;

pub struct ScriptedCompletion {
    responder: Box<Responder>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn new(responder: impl Fn(&str) -> Scripted + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    /// Replies with the text between the last pair of `---` fences in the prompt,
    /// so tests can follow content through chunk and reduce calls.
    pub fn echo() -> Arc<Self> {
        Self::new(|prompt| Scripted::reply(fenced_payload(prompt)))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|p| p.contains(needle)).count()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &str,
        deadline: Option<Duration>,
    ) -> Result<String, CompletionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let scripted = (self.responder)(prompt);
        enforce_deadline(deadline, async move {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            scripted.result
        })
        .await
    }
}

/// Text between the last two `---` fence lines of a prompt.
pub fn fenced_payload(prompt: &str) -> String {
    let fences: Vec<usize> = prompt.match_indices("\n---\n").map(|(i, _)| i).collect();
    match fences.as_slice() {
        [.., open, close] => prompt[open + 5..*close].trim().to_string(),
        _ => prompt.trim().to_string(),
    }
}
