/// Convenience result type used by host-facing backdrop APIs.
pub type Result<T> = std::result::Result<T, BackdropError>;

/// Failures that can escape the renderer. Drawing itself never fails; only the
/// host side (presenting a frame, sizing a backing buffer) can.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host rejected or could not display a finished frame.
    #[error("present error: {0}")]
    Present(String),

    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: usize, height: usize },
}

impl BackdropError {
    pub fn present(msg: impl Into<String>) -> Self {
        Self::Present(msg.into())
    }
}
