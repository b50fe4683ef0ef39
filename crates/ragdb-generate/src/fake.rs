//! Canned-answer generator for tests and offline runs. Deterministic, no
//! weights, optional artificial latency for exercising timeout handling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ragdb_core::error::Result;
use ragdb_core::traits::Generator;
use ragdb_core::types::Generation;

pub struct EchoGenerator {
    model_name: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl EchoGenerator {
    pub fn new(model_name: &str) -> Self {
        Self { model_name: model_name.to_string(), delay: None, calls: AtomicUsize::new(0) }
    }

    /// Sleep for `delay` inside every `generate` call.
    pub fn with_delay(model_name: &str, delay: Duration) -> Self {
        Self { model_name: model_name.to_string(), delay: Some(delay), calls: AtomicUsize::new(0) }
    }

    /// Number of `generate` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Generator for EchoGenerator {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate(&self, prompt: &str) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        // Echo the question section back so callers can see their prompt
        // structure flowed through.
        let question = prompt
            .split("### Question:")
            .nth(1)
            .and_then(|rest| rest.split("### Answer:").next())
            .map(str::trim)
            .unwrap_or("");
        let answer = format!("Echo: {question}");
        Ok(Generation { answer, elapsed_secs: start.elapsed().as_secs_f64() })
    }
}
