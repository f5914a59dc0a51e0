use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

/// Status reported while the engine is reading characters. Other statuses
/// (loading models, initializing) carry no useful progress.
pub const RECOGNIZING_TEXT: &str = "recognizing text";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// One progress notification from a recognition run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionEvent {
    pub status: String,
    /// Nominally 0.0–1.0; consumers clamp.
    pub progress: f32,
}

impl RecognitionEvent {
    pub fn recognizing(progress: f32) -> Self {
        Self { status: RECOGNIZING_TEXT.to_string(), progress }
    }
}

/// Abstraction over an OCR backend.
///
/// Implementations take PNG bytes and a language hint such as `eng+tha`,
/// return the recognized UTF-8 text with line breaks preserved, and may call
/// `on_event` any number of times (including never) while working.
pub trait OcrBackend: Send + Sync {
    fn recognize(
        &self,
        image_png: &[u8],
        language: &str,
        on_event: &mut dyn FnMut(RecognitionEvent),
    ) -> Result<String, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns pre-set text, one entry per call, repeating the last entry once the
/// list runs out. Useful for driving the two-pass pipeline without Tesseract.
pub struct MockRecognizer {
    passes: Vec<String>,
    progress: Vec<f32>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_passes([text.into()])
    }

    pub fn with_passes<I, S>(passes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passes: passes.into_iter().map(Into::into).collect(),
            progress: Vec::new(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with an engine error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), ..Self::with_passes(Vec::<String>::new()) }
    }

    /// Emit these `recognizing text` progress values on every call.
    pub fn with_progress(mut self, progress: Vec<f32>) -> Self {
        self.progress = progress;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(
        &self,
        _image_png: &[u8],
        _language: &str,
        on_event: &mut dyn FnMut(RecognitionEvent),
    ) -> Result<String, OcrError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        on_event(RecognitionEvent { status: "loading language traineddata".into(), progress: 0.5 });
        for p in &self.progress {
            on_event(RecognitionEvent::recognizing(*p));
        }
        if let Some(message) = &self.failure {
            return Err(OcrError::Engine(message.clone()));
        }
        Ok(self.passes.get(call).or(self.passes.last()).cloned().unwrap_or_default())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Runs the `tesseract` executable, piping the image through stdin and reading
/// the text from stdout. Needs the language data for every requested language.
pub struct TesseractCommand {
    program: PathBuf,
}

impl TesseractCommand {
    pub fn new() -> Self {
        Self { program: PathBuf::from("tesseract") }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractCommand {
    fn recognize(
        &self,
        image_png: &[u8],
        language: &str,
        on_event: &mut dyn FnMut(RecognitionEvent),
    ) -> Result<String, OcrError> {
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::NotAvailable(format!("{} not found on PATH", self.program.display()))
                }
                _ => OcrError::Engine(e.to_string()),
            })?;

        on_event(RecognitionEvent::recognizing(0.0));

        // Tesseract reads the whole image before writing anything, so writing
        // first and collecting afterwards cannot deadlock. A write can still
        // fail when the process exits early; reap it and prefer its stderr.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_png),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|e| OcrError::Engine(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match (stderr.trim(), written) {
                ("", Err(e)) => e.to_string(),
                (text, _) => text.to_string(),
            };
            let message = format!("tesseract exited with {}: {detail}", output.status);
            return Err(OcrError::Engine(message));
        }
        written.map_err(|e| OcrError::Engine(e.to_string()))?;

        on_event(RecognitionEvent::recognizing(1.0));
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, RecognitionEvent};
    use leptess::LepTess;

    /// In-process libtesseract. Progress is only reported at the start and end
    /// of a run.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(
            &self,
            image_png: &[u8],
            language: &str,
            on_event: &mut dyn FnMut(RecognitionEvent),
        ) -> Result<String, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), language)
                .map_err(|e| OcrError::NotAvailable(e.to_string()))?;
            lt.set_image_from_mem(image_png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            on_event(RecognitionEvent::recognizing(0.0));
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            on_event(RecognitionEvent::recognizing(1.0));
            Ok(text)
        }
    }
}
