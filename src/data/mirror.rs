//! Best-effort remote copy of the question collection.

use std::time::Duration;

use log::{info, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::models::Question;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives the full collection after every successful local save.
///
/// Implementations must not block and must not report failure to the caller.
pub trait Mirror {
    fn replace_all(&self, questions: &[Question]);
}

/// Result of one remote replace-all call, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    Synced { count: usize },
    Failed { reason: String },
}

/// `PUT`s the collection as a JSON array to a fixed endpoint on a detached task.
pub struct HttpMirror {
    client: reqwest::Client,
    url: String,
    outcomes: Option<mpsc::UnboundedSender<MirrorOutcome>>,
}

impl HttpMirror {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            outcomes: None,
        })
    }

    /// Also forward each outcome to `outcomes`.
    pub fn with_outcomes(mut self, outcomes: mpsc::UnboundedSender<MirrorOutcome>) -> Self {
        self.outcomes = Some(outcomes);
        self
    }
}

impl Mirror for HttpMirror {
    fn replace_all(&self, questions: &[Question]) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, skipping remote sync to {}", self.url);
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let outcomes = self.outcomes.clone();
        let questions = questions.to_vec();

        runtime.spawn(async move {
            let outcome = match client.put(&url).json(&questions).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("mirrored {} questions to {}", questions.len(), url);
                    MirrorOutcome::Synced {
                        count: questions.len(),
                    }
                }
                Ok(response) => {
                    warn!("remote sync to {} rejected: {}", url, response.status());
                    MirrorOutcome::Failed {
                        reason: format!("server responded {}", response.status()),
                    }
                }
                Err(e) => {
                    warn!("remote sync to {} failed: {}", url, e);
                    MirrorOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            if let Some(outcomes) = outcomes {
                let _ = outcomes.send(outcome);
            }
        });
    }
}
