use std::path::Path;

use thiserror::Error;

use crate::RecognizedText;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("unsupported input: {0}")]
    Unsupported(String),
    #[error("recognition engine failed: {0}")]
    Engine(String),
    #[error("recognized text is not valid UTF-8")]
    Encoding,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fractional completion reported while an image is being recognized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionProgress(f64);

impl RecognitionProgress {
    pub const STARTED: RecognitionProgress = RecognitionProgress(0.0);
    pub const DONE: RecognitionProgress = RecognitionProgress(1.0);

    /// Clamp `fraction` into `[0, 1]`; NaN counts as no progress.
    pub fn new(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self::STARTED;
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    pub fn fraction(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> u64 {
        (self.0 * 100.0).round() as u64
    }
}

/// Trait for text recognition backends.
///
/// Implementors turn an image (or an already-transcribed file) into
/// [`RecognizedText`]; turning that text into schedule entries lives in
/// `timetable_parsing::TimetableExtractor`.
pub trait TextRecognizer: Send + Sync {
    /// Short name for log lines and progress output.
    fn name(&self) -> &str;

    /// Recognize the text in `path`, reporting progress along the way.
    fn recognize(
        &self,
        path: &Path,
        progress: &dyn Fn(RecognitionProgress),
    ) -> Result<RecognizedText, RecognitionError>;
}
