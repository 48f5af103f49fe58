//! Per-pass and per-cycle outcomes reported by the core.

use crate::error::AirmonError;

/// What happened to one channel during an acquisition pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelStatus {
    /// A fresh value was stored.
    Updated,
    /// The read failed; the previous value was kept.
    Retained(AirmonError),
}

impl ChannelStatus {
    pub fn is_updated(&self) -> bool {
        matches!(self, ChannelStatus::Updated)
    }
}

/// Result of one dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The network link was down. Nothing was sent; a reconnect was tried.
    LinkDown { reconnected: bool },
    /// Sends were attempted. `None` means the path is not configured.
    Attempted {
        upload: Option<Result<i32, AirmonError>>,
        publish: Option<Result<(), AirmonError>>,
    },
    /// Handed to the background dispatch worker.
    Queued,
}

impl DispatchOutcome {
    /// True when the primary upload went through.
    pub fn upload_ok(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Attempted {
                upload: Some(Ok(_)),
                ..
            }
        )
    }
}
