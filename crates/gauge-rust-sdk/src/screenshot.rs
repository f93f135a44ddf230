//! Screenshot capture on failure

/// Capability that captures a screenshot when a hook or step fails.
///
/// Projects driving a browser or a desktop app implement this and hand it to
/// the runner; the bytes end up in the failed `ExecutionResult`.
pub trait ScreenGrabber: Send + Sync {
    /// Capture the current screen. `None` means nothing could be captured.
    fn take_screenshot(&self) -> Option<Vec<u8>>;
}

impl<F> ScreenGrabber for F
where
    F: Fn() -> Option<Vec<u8>> + Send + Sync,
{
    fn take_screenshot(&self) -> Option<Vec<u8>> {
        self()
    }
}
