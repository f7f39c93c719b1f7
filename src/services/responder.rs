//! Hybrid responder
//!
//! Produces one reply per utterance by trying, in order:
//! - exit commands
//! - the curated intent store
//! - the external encyclopedia
//! - a canned "I don't know" message

use derive_more::Display;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::config::ResponderConfig;
use crate::encyclopedia::{self, EncyclopediaClient, EncyclopediaError, ExternalAnswer};
use crate::error::{AppError, Result};
use crate::matching::{command_key, match_intent};
use crate::models::intent::IntentStore;
use crate::observability::ResponderMetrics;
use crate::services::random::{RandomSource, choose, entropy_source};

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ResponseSource {
    #[display("System")]
    System,

    #[display("Chatbot Knowledge")]
    ChatbotKnowledge,

    #[display("Wikipedia")]
    Wikipedia,
}

/// A single reply
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub source: ResponseSource,
    /// Set when the utterance was an exit command
    pub end_session: bool,
}

impl Reply {
    pub fn new(text: impl Into<String>, source: ResponseSource) -> Self {
        Self {
            text: text.into(),
            source,
            end_session: false,
        }
    }

    fn farewell(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ResponseSource::System,
            end_session: true,
        }
    }
}

pub struct Responder {
    store: Arc<IntentStore>,
    encyclopedia: Box<dyn EncyclopediaClient>,
    threshold: f64,
    exit_commands: HashSet<String>,
    farewell_message: String,
    session_farewell: String,
    fallback_messages: Vec<String>,
    max_clarification_options: usize,
    lookup_timeout: Option<Duration>,
    rng: Mutex<Box<dyn RandomSource>>,
    metrics: Arc<ResponderMetrics>,
}

impl Responder {
    pub fn new(
        store: Arc<IntentStore>,
        encyclopedia: Box<dyn EncyclopediaClient>,
        config: &ResponderConfig,
    ) -> Self {
        Self {
            store,
            encyclopedia,
            threshold: config.similarity_threshold,
            exit_commands: config
                .exit_commands
                .iter()
                .map(|command| command_key(command))
                .filter(|command| !command.is_empty())
                .collect(),
            farewell_message: config.farewell_message.clone(),
            session_farewell: config.session_farewell.clone(),
            fallback_messages: config.fallback_messages.clone(),
            max_clarification_options: config.max_clarification_options,
            lookup_timeout: None,
            rng: Mutex::new(entropy_source()),
            metrics: Arc::new(ResponderMetrics::default()),
        }
    }

    /// Replaces the random source, e.g. with a seeded generator
    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Bounds the whole encyclopedia lookup; expiry counts as a transient failure
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ResponderMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<ResponderMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> &IntentStore {
        &self.store
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Printed by an interactive session that ends on an exit command
    pub fn session_farewell(&self) -> &str {
        &self.session_farewell
    }

    /// Trimmed, case-insensitive comparison against the exit commands
    pub fn is_exit_command(&self, utterance: &str) -> bool {
        self.exit_commands.contains(&command_key(utterance))
    }

    /// Runs the fallback chain for one utterance.
    ///
    /// Encyclopedia failures never surface here; an `Err` means the reply could
    /// not be produced at all (for instance no fallback message to pick).
    pub async fn respond(&self, utterance: &str) -> Result<Reply> {
        if self.is_exit_command(utterance) {
            self.metrics.record_exit();
            self.metrics.record_reply(ResponseSource::System);
            return Ok(Reply::farewell(self.farewell_message.clone()));
        }

        if let Some(reply) = self.reply_from_intents(utterance) {
            self.metrics.record_reply(reply.source);
            return Ok(reply);
        }

        if let Some(reply) = self.reply_from_encyclopedia(utterance).await {
            self.metrics.record_reply(reply.source);
            return Ok(reply);
        }

        let text = self
            .pick(&self.fallback_messages)
            .ok_or_else(|| AppError::Internal("no fallback messages configured".into()))?;
        self.metrics.record_reply(ResponseSource::System);
        Ok(Reply::new(text, ResponseSource::System))
    }

    fn reply_from_intents(&self, utterance: &str) -> Option<Reply> {
        let matched = match_intent(utterance, &self.store, self.threshold)?;

        match self.pick(&matched.intent.responses) {
            Some(text) => Some(Reply::new(text, ResponseSource::ChatbotKnowledge)),
            None => {
                warn!(tag = %matched.intent.tag, "Matched intent has no responses");
                None
            }
        }
    }

    async fn reply_from_encyclopedia(&self, utterance: &str) -> Option<Reply> {
        if utterance.trim().is_empty() {
            return None;
        }

        let lookup = encyclopedia::lookup(self.encyclopedia.as_ref(), utterance);
        let result = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .unwrap_or_else(|_| {
                    Err(EncyclopediaError::Transient(format!(
                        "lookup timed out after {limit:?}"
                    )))
                }),
            None => lookup.await,
        };

        match result {
            Ok(Some(ExternalAnswer::Summary(summary))) => Some(Reply::new(
                format!("According to Wikipedia: {summary}"),
                ResponseSource::Wikipedia,
            )),
            Ok(Some(ExternalAnswer::Clarify(options))) if !options.is_empty() => {
                let shown: Vec<&str> = options
                    .iter()
                    .take(self.max_clarification_options)
                    .map(String::as_str)
                    .collect();
                Some(Reply::new(
                    format!("Multiple options found. Did you mean: {}?", shown.join(", ")),
                    ResponseSource::Wikipedia,
                ))
            }
            Ok(Some(ExternalAnswer::Clarify(_))) => {
                debug!(utterance, "Ambiguous topic without candidates");
                None
            }
            Ok(None) => {
                debug!(utterance, "No encyclopedia candidates");
                None
            }
            Err(e) => {
                self.metrics.record_lookup_failure();
                match e {
                    EncyclopediaError::NotFound(_) => debug!(utterance, error = %e, "Encyclopedia lookup found nothing"),
                    _ => warn!(utterance, error = %e, "Encyclopedia lookup failed"),
                }
                None
            }
        }
    }

    fn pick(&self, items: &[String]) -> Option<String> {
        let mut rng = self.rng.lock();
        choose(rng.as_mut(), items).cloned()
    }
}
