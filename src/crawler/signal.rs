//! Per-stage failure signals
//!
//! Each stage owns one `StageSignal`. A stage that hits a fatal error records
//! the error and fires its signal; the coordinator is the only party that
//! waits on both signals.

use crate::CrawlError;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// The two pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Walks listing pages and emits links
    Discovery,

    /// Resolves links into detail records
    Detail,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot failure signal carrying a reason
///
/// Cloning shares the signal. The first call to [`StageSignal::fail`] wins;
/// later calls are ignored.
#[derive(Debug, Clone)]
pub struct StageSignal {
    stage: Stage,
    token: CancellationToken,
    reason: Arc<Mutex<Option<CrawlError>>>,
}

impl StageSignal {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            token: CancellationToken::new(),
            reason: Arc::new(Mutex::new(None)),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Records `error` as the failure reason and fires the signal
    ///
    /// Returns false if the signal had already fired.
    pub fn fail(&self, error: CrawlError) -> bool {
        let mut reason = self.reason.lock().unwrap_or_else(|e| e.into_inner());
        if self.token.is_cancelled() {
            return false;
        }
        *reason = Some(error);
        self.token.cancel();
        true
    }

    /// Completes once the signal has fired
    pub async fn failed(&self) {
        self.token.cancelled().await
    }

    pub fn is_failed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Takes the recorded reason, leaving the signal fired
    pub fn take_reason(&self) -> Option<CrawlError> {
        self.reason
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}
