//! Shared application state

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use triage_engine::{
    InMemorySessionStore, MessageClassifier, Reply, RuleSet, RulesConfig, SessionStore,
};
use triage_telemetry::{ChatMetrics, TranscriptRecord, TranscriptWriter};

use crate::config::ServerConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Classifier with its session store
    pub classifier: Arc<MessageClassifier>,

    /// Transcript sink, absent when persistence is disabled
    pub transcripts: Option<Arc<Mutex<TranscriptWriter>>>,

    /// Process-local traffic counters
    pub metrics: ChatMetrics,

    /// Prometheus handle for rendering, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration: load rules, create the session store
    /// and open the transcript writer
    pub fn new(config: ServerConfig, metrics_handle: Option<PrometheusHandle>) -> Result<Self> {
        let rules_config = match &config.rules_path {
            Some(path) => {
                info!("Loading rules from {}", path.display());
                RulesConfig::from_file(path)
                    .with_context(|| format!("failed to load rules from {}", path.display()))?
            }
            None => {
                info!("Using built-in rules");
                RulesConfig::default()
            }
        };

        let rules = RuleSet::from_config(rules_config).context("invalid rule tables")?;
        info!(
            symptoms = rules.symptom_count(),
            emergency_keywords = rules.emergency_keyword_count(),
            "Rules loaded"
        );

        let store: Arc<dyn SessionStore> = match config.max_sessions {
            Some(limit) => {
                info!("Session store limited to {} sessions", limit);
                Arc::new(InMemorySessionStore::with_limit(limit))
            }
            None => Arc::new(InMemorySessionStore::new()),
        };

        let transcripts = match &config.transcript {
            Some(transcript) => {
                let writer = TranscriptWriter::new(transcript.clone()).with_context(|| {
                    format!(
                        "failed to open transcript directory {}",
                        transcript.dir.display()
                    )
                })?;
                info!("Persisting transcripts to {}", transcript.dir.display());
                Some(Arc::new(Mutex::new(writer)))
            }
            None => {
                info!("Transcript persistence disabled");
                None
            }
        };

        Ok(Self {
            config: Arc::new(config),
            classifier: Arc::new(MessageClassifier::new(Arc::new(rules), store)),
            transcripts,
            metrics: ChatMetrics::new(),
            metrics_handle,
        })
    }

    /// Append one exchange to the transcript, if persistence is enabled.
    ///
    /// Write failures are logged and counted; the chat reply is unaffected.
    pub async fn persist(&self, session_id: &str, message: &str, reply: &Reply) {
        let Some(writer) = self.transcripts.clone() else {
            return;
        };

        let record = TranscriptRecord::new(
            session_id,
            message,
            reply.text.clone(),
            reply.branch.as_str(),
        );

        let result = tokio::task::spawn_blocking(move || writer.lock().write(&record)).await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to persist transcript");
                self.metrics.record_error("transcript");
            }
            Err(e) => {
                tracing::error!(error = %e, "Transcript task failed");
                self.metrics.record_error("transcript");
            }
        }
    }

    /// Flush buffered transcript records
    pub fn flush_transcripts(&self) {
        if let Some(writer) = &self.transcripts {
            if let Err(e) = writer.lock().flush() {
                tracing::warn!(error = %e, "Failed to flush transcripts");
            }
        }
    }
}
