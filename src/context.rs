//! Per-operation context threaded through every load/save call.
//!
//! Carries the caller's progress sink and cancellation token, and collects
//! human-readable error messages so a caller processing a batch of files can
//! show them after the fact.

use enough::{Stop, Unstoppable};

use crate::error::Error;

static UNSTOPPABLE: Unstoppable = Unstoppable;

/// State of one decode, encode or rotate operation.
pub struct CodecContext<'a> {
    stop: &'a dyn Stop,
    progress: Option<Box<dyn FnMut(f64) + 'a>>,
    errors: Vec<String>,
    has_alpha: bool,
}

impl Default for CodecContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodecContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecContext")
            .field("errors", &self.errors)
            .field("has_alpha", &self.has_alpha)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> CodecContext<'a> {
    /// Context with no progress sink that never stops.
    pub fn new() -> Self {
        Self {
            stop: &UNSTOPPABLE,
            progress: None,
            errors: Vec::new(),
            has_alpha: false,
        }
    }

    /// Poll `stop` for cancellation.
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = stop;
        self
    }

    /// Report progress fractions in `[0, 1]` to `sink`.
    pub fn with_progress(mut self, sink: impl FnMut(f64) + 'a) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Report a progress fraction, clamped to `[0, 1]`.
    pub fn progress(&mut self, fraction: f64) {
        if let Some(sink) = self.progress.as_mut() {
            sink(fraction.clamp(0.0, 1.0));
        }
    }

    /// Whether the caller asked to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop.check().is_err()
    }

    /// Record a failure message.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.errors.push(message);
    }

    /// Record `err` and hand it back, for use in `map_err`.
    pub(crate) fn fail(&mut self, err: Error) -> Error {
        self.error(err.to_string());
        err
    }

    /// Messages recorded so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether the last decoded image turned out to carry transparency.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub(crate) fn set_has_alpha(&mut self, has_alpha: bool) {
        self.has_alpha = has_alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Flag(AtomicBool);

    impl Stop for Flag {
        fn check(&self) -> Result<(), enough::StopReason> {
            if self.0.load(Ordering::Relaxed) {
                Err(enough::StopReason::Cancelled)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_default_never_stops() {
        let ctx = CodecContext::new();
        assert!(!ctx.is_stopped());
        assert!(ctx.errors().is_empty());
    }

    #[test]
    fn test_stop_is_polled() {
        let flag = Flag(AtomicBool::new(false));
        let ctx = CodecContext::new().with_stop(&flag);
        assert!(!ctx.is_stopped());
        flag.0.store(true, Ordering::Relaxed);
        assert!(ctx.is_stopped());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut seen = Vec::new();
        {
            let mut ctx = CodecContext::new().with_progress(|f| seen.push(f));
            ctx.progress(0.5);
            ctx.progress(1.5);
            ctx.progress(-1.0);
        }
        assert_eq!(seen, vec![0.5, 1.0, 0.0]);
    }

    #[test]
    fn test_errors_are_collected() {
        let mut ctx = CodecContext::new();
        let err = ctx.fail(Error::InvalidData("bad CRC".into()));
        assert!(matches!(err, Error::InvalidData(_)));
        assert_eq!(ctx.errors(), &["invalid PNG data: bad CRC".to_string()]);
    }
}
