//! Notification contract between long-running pipelines and a front end

use std::path::Path;

/// Receives coarse progress events from save, load and cleanup
///
/// Implementations must not feed anything back into the pipeline. Every
/// method has an empty default so sinks only implement what they display.
pub trait Progress {
    /// A pipeline phase begins
    fn start(&mut self, _message: &str) {}

    /// One file or blob was processed
    fn item(&mut self, _path: &Path) {}

    /// The pipeline finished; no further events follow
    fn done(&mut self, _message: &str) {}
}

/// Progress sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {}
