//! Mock backend for testing
//!
//! Provides deterministic replies for the advisor.
//! Useful for unit tests and development without network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::AdviceRequest;
use super::AdvisorBackend;

/// Mock advisor backend for testing
///
/// Returns keyword-based canned replies. Can be configured to fail or to
/// return a fixed reply, and records every request it receives.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether advise should return an error
    pub failing: bool,
    /// Fixed reply overriding the canned ones
    reply: Option<String>,
    requests: Arc<Mutex<Vec<AdviceRequest>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Default::default()
        }
    }

    /// Create a mock whose advise calls always fail
    pub fn failing() -> Self {
        Self {
            healthy: true,
            failing: true,
            ..Default::default()
        }
    }

    /// Create a mock that always answers with `reply`
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            healthy: true,
            reply: Some(reply.into()),
            ..Default::default()
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<AdviceRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

/// Keyword-matched reply used by the mock backend and the mock HTTP server
pub fn canned_reply(prompt: &str) -> String {
    let p = prompt.to_lowercase();
    if p.contains("summarize") {
        "**Spending summary**: Food and Other take the largest share of your budget. \
         Food is within its limit; keep an eye on Other."
            .to_string()
    } else if p.contains("tips") {
        "Here are 3 quick tips:\n1. Cook at home twice more a week.\n\
         2. Pause one subscription.\n3. Move savings on payday."
            .to_string()
    } else if p.contains("plan") {
        "**Plan**: Trim Other by 1,400 a month to close the shortfall before the deadline."
            .to_string()
    } else if p.contains("goal") {
        "Your goal is within reach, but you are short at the current savings rate.".to_string()
    } else {
        "Noted. Keep your savings rate steady and review your limits weekly.".to_string()
    }
}

#[async_trait]
impl AdvisorBackend for MockBackend {
    async fn advise(&self, request: &AdviceRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.failing {
            return Err(Error::Advisor("Mock backend configured to fail".into()));
        }

        Ok(match self.reply {
            Some(ref reply) => reply.clone(),
            None => canned_reply(&request.prompt),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
