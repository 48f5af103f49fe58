//! Test and helper stand-ins for airmon_core collaborators.

use crate::readings::Snapshot;
use crate::render::{RenderError, Renderer};
use crate::status::DispatchOutcome;
use crate::transport::Dispatch;

/// Renders nothing; useful when only the readings or the dispatch path
/// matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn init(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn render(&mut self, _snapshot: &Snapshot) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Transport for display-only runs: every cycle is attempted with no path
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTransport;

impl Dispatch for NoTransport {
    fn dispatch(&mut self, _snapshot: &Snapshot) -> DispatchOutcome {
        DispatchOutcome::Attempted {
            upload: None,
            publish: None,
        }
    }
}
