//! Local display seam.

use crate::readings::Snapshot;

pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Something that shows the current snapshot to a person or a pipe.
pub trait Renderer {
    /// Bring the device up. Failure here is fatal at startup.
    fn init(&mut self) -> Result<(), RenderError>;

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError>;

    /// Short status line ("Connecting WiFi...", ...).
    fn notice(&mut self, _message: &str) -> Result<(), RenderError> {
        Ok(())
    }
}

impl<T: Renderer + ?Sized> Renderer for Box<T> {
    fn init(&mut self) -> Result<(), RenderError> {
        (**self).init()
    }

    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        (**self).render(snapshot)
    }

    fn notice(&mut self, message: &str) -> Result<(), RenderError> {
        (**self).notice(message)
    }
}
