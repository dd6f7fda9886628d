use std::path::Path;
use std::process::Command;

use timetable_core::{RecognitionError, RecognitionProgress, RecognizedText, TextRecognizer};

/// Program invoked by [`CommandRecognizer::default`].
pub const DEFAULT_OCR_PROGRAM: &str = "tesseract";

/// Reads text that was already transcribed into a UTF-8 file.
///
/// Useful for re-importing OCR output and for scripted imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRecognizer;

impl TextRecognizer for PlainTextRecognizer {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn recognize(
        &self,
        path: &Path,
        progress: &dyn Fn(RecognitionProgress),
    ) -> Result<RecognizedText, RecognitionError> {
        progress(RecognitionProgress::STARTED);
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| RecognitionError::Encoding)?;
        progress(RecognitionProgress::DONE);
        Ok(RecognizedText::new(text))
    }
}

/// Runs an external OCR program and captures its standard output.
///
/// The invocation is `<program> <image> stdout [args...]`, which is the
/// tesseract calling convention. The program gives no progress of its own,
/// so only the start and the end are reported.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_OCR_PROGRAM)
    }
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments appended after the output target (e.g. `--psm 6`).
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl TextRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn recognize(
        &self,
        path: &Path,
        progress: &dyn Fn(RecognitionProgress),
    ) -> Result<RecognizedText, RecognitionError> {
        if !path.is_file() {
            return Err(RecognitionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such image: {}", path.display()),
            )));
        }

        progress(RecognitionProgress::STARTED);
        tracing::debug!(program = %self.program, image = %path.display(), "running OCR command");

        let output = Command::new(&self.program)
            .arg(path)
            .arg("stdout")
            .args(&self.args)
            .output()
            .map_err(|e| {
                RecognitionError::Engine(format!("failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(RecognitionError::Engine(message));
        }

        let text = String::from_utf8(output.stdout).map_err(|_| RecognitionError::Encoding)?;
        progress(RecognitionProgress::DONE);
        Ok(RecognizedText::new(text))
    }
}

/// File extensions handed to the OCR command.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp", "pnm", "pbm", "pgm", "ppm",
];

/// Pick a recognizer for `path` by its extension.
///
/// `.txt` files are read as-is and images go through the OCR command
/// (`program`, or tesseract when `None`). Any other file is
/// [`RecognitionError::Unsupported`].
pub fn recognizer_for(
    path: &Path,
    program: Option<&str>,
    args: Vec<String>,
) -> Result<Box<dyn TextRecognizer>, RecognitionError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ext == "txt" {
        return Ok(Box::new(PlainTextRecognizer));
    }
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        let program = program.unwrap_or(DEFAULT_OCR_PROGRAM);
        return Ok(Box::new(CommandRecognizer::new(program).with_args(args)));
    }

    let kind = if ext.is_empty() {
        "no file extension".to_string()
    } else {
        format!(".{} files", ext)
    };
    Err(RecognitionError::Unsupported(format!(
        "{} ({}); expected an image or a .txt transcript",
        path.display(),
        kind
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;

    fn collect_progress(
        recognizer: &dyn TextRecognizer,
        path: &Path,
    ) -> (Result<RecognizedText, RecognitionError>, Vec<f64>) {
        let seen = RefCell::new(Vec::new());
        let result = recognizer.recognize(path, &|p| seen.borrow_mut().push(p.fraction()));
        (result, seen.into_inner())
    }

    #[test]
    fn test_plain_text_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "Monday Physics L-313").unwrap();
        let (result, progress) = collect_progress(&PlainTextRecognizer, file.path());
        assert_eq!(result.unwrap().as_str(), "Monday Physics L-313\n");
        assert_eq!(progress, vec![0.0, 1.0]);
    }

    #[test]
    fn test_plain_text_rejects_binary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();
        let result = PlainTextRecognizer.recognize(file.path(), &|_| {});
        assert!(matches!(result, Err(RecognitionError::Encoding)));
    }

    #[test]
    fn test_plain_text_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlainTextRecognizer.recognize(&dir.path().join("nope.txt"), &|_| {});
        assert!(matches!(result, Err(RecognitionError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_captures_stdout() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let recognizer = CommandRecognizer::new("echo").with_args(vec!["extra".into()]);
        let (result, progress) = collect_progress(&recognizer, file.path());
        let text = result.unwrap();
        assert_eq!(
            text.as_str().trim(),
            format!("{} stdout extra", file.path().display())
        );
        assert_eq!(progress, vec![0.0, 1.0]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_stderr() {
        // `cat <image> stdout` fails because there is no file named "stdout".
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("scan.png");
        std::fs::write(&image, b"not really a png").unwrap();
        let recognizer = CommandRecognizer::new("cat");
        let result = recognizer.recognize(&image, &|_| {});
        match result {
            Err(RecognitionError::Engine(msg)) => assert!(msg.contains("stdout"), "{msg}"),
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_command_missing_program() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let recognizer = CommandRecognizer::new("definitely-not-an-ocr-program-7f3a");
        let result = recognizer.recognize(file.path(), &|_| {});
        assert!(matches!(result, Err(RecognitionError::Engine(_))));
    }

    #[test]
    fn test_command_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let result = CommandRecognizer::default().recognize(&dir.path().join("gone.png"), &|_| {});
        assert!(matches!(result, Err(RecognitionError::Io(_))));
    }

    fn picked(path: &str, program: Option<&str>) -> String {
        recognizer_for(Path::new(path), program, vec![])
            .unwrap()
            .name()
            .to_string()
    }

    #[test]
    fn test_recognizer_for_picks_by_extension() {
        assert_eq!(picked("week.TXT", None), "plain-text");
        assert_eq!(picked("week.png", None), "tesseract");
        assert_eq!(picked("week.JPEG", None), "tesseract");
        assert_eq!(picked("week.jpg", Some("ocrmypdf")), "ocrmypdf");
    }

    #[test]
    fn test_recognizer_for_rejects_unknown_files() {
        match recognizer_for(Path::new("notes/week.docx"), None, vec![]) {
            Err(RecognitionError::Unsupported(msg)) => assert!(msg.contains(".docx"), "{msg}"),
            Err(other) => panic!("expected unsupported, got {other:?}"),
            Ok(r) => panic!("expected unsupported, got {}", r.name()),
        }
        assert!(matches!(
            recognizer_for(Path::new("timetable"), None, vec![]),
            Err(RecognitionError::Unsupported(_))
        ));
    }
}
