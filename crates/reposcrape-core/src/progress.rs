//! Progress reporting.

use std::fmt;

/// Caller supplied progress callback.
///
/// Receives a human readable status line and whether the caller should
/// advance its progress indicator.
pub type ProgressFn<'a> = &'a mut dyn FnMut(&str, bool);

/// Thin handle around an optional progress callback.
///
/// Every call goes straight to the callback; nothing is buffered or
/// filtered. Backends emit any number of [`status`](Self::status) lines and
/// exactly one [`advance`](Self::advance) line per scrape.
pub struct Progress<'a> {
    callback: Option<ProgressFn<'a>>,
}

impl<'a> Progress<'a> {
    /// Wraps an optional callback.
    pub fn new(callback: Option<ProgressFn<'a>>) -> Self {
        Self { callback }
    }

    /// A progress handle that reports nowhere.
    pub fn none() -> Self {
        Self { callback: None }
    }

    /// Reports a status line without advancing.
    pub fn status(&mut self, message: impl AsRef<str>) {
        self.emit(message.as_ref(), false);
    }

    /// Reports a status line and advances.
    pub fn advance(&mut self, message: impl AsRef<str>) {
        self.emit(message.as_ref(), true);
    }

    fn emit(&mut self, message: &str, advance: bool) {
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(message, advance);
        }
    }
}

impl fmt::Debug for Progress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_every_call() {
        let mut calls = Vec::new();
        let mut record = |msg: &str, advance: bool| calls.push((msg.to_string(), advance));

        let mut progress = Progress::new(Some(&mut record));
        progress.status("cloning");
        progress.status("cloning");
        progress.advance("done");
        drop(progress);

        assert_eq!(
            calls,
            vec![
                ("cloning".to_string(), false),
                ("cloning".to_string(), false),
                ("done".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_none_is_silent() {
        let mut progress = Progress::none();
        progress.status("ignored");
        progress.advance("ignored");
    }
}
