use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use slipread_core::ScanConfig;
use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess::{self, PreparedSlip};
use crate::progress::{
    batch_percent, completed_percent, NoProgress, ProgressSink, ProgressUpdate, ScanStage,
};
use crate::recognizer::{OcrBackend, OcrError, RecognitionEvent, RECOGNIZING_TEXT};
use crate::types::{SlipFields, SlipOutcome};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Where a slip is in its two-pass read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPass {
    /// Bottom crop, where amount and memo usually sit.
    Primary,
    /// The whole image, only for fields the primary pass missed.
    Fallback,
    Done,
}

impl ScanPass {
    pub fn next(self, fields: &SlipFields) -> ScanPass {
        match self {
            ScanPass::Primary if fields.is_complete() => ScanPass::Done,
            ScanPass::Primary => ScanPass::Fallback,
            ScanPass::Fallback | ScanPass::Done => ScanPass::Done,
        }
    }
}

/// The outcome for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct SlipScan {
    pub source: PathBuf,
    #[serde(flatten)]
    pub outcome: SlipOutcome,
}

/// Position of the file being read within its batch.
struct FileSlot<'a> {
    index: usize,
    total: usize,
    name: &'a str,
}

impl FileSlot<'_> {
    fn update(&self, stage: ScanStage, percent: u8) -> ProgressUpdate {
        ProgressUpdate {
            stage,
            file_index: self.index,
            total_files: self.total,
            file_name: self.name.to_string(),
            percent,
        }
    }
}

/// Orchestrates: read → preprocess → primary OCR → (fallback OCR) → merge.
///
/// Recognition blocks, so each pass runs on tokio's blocking pool.
pub struct SlipPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    config: ScanConfig,
}

impl<R: OcrBackend + 'static> SlipPipeline<R> {
    pub fn new(recognizer: R, config: ScanConfig) -> Self {
        Self { recognizer: Arc::new(recognizer), config }
    }

    /// Read one slip from disk.
    pub async fn process_file(&self, path: &Path) -> Result<SlipFields, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes).await
    }

    /// Read one slip from raw image bytes (PNG / JPEG / WEBP / …).
    pub async fn process_bytes(&self, data: &[u8]) -> Result<SlipFields, PipelineError> {
        let slot = FileSlot { index: 0, total: 1, name: "" };
        self.scan(data, &slot, &NoProgress).await
    }

    /// Read every file in order. A file that fails becomes a
    /// [`SlipOutcome::Failed`] and the batch carries on.
    pub async fn run_batch(&self, paths: &[PathBuf], progress: &dyn ProgressSink) -> Vec<SlipScan> {
        let total = paths.len();
        let mut scans = Vec::with_capacity(total);
        if total == 0 {
            return scans;
        }

        for (index, path) in paths.iter().enumerate() {
            let name = display_name(path);
            let slot = FileSlot { index, total, name: &name };

            let result = match tokio::fs::read(path).await {
                Ok(bytes) => self.scan(&bytes, &slot, progress).await,
                Err(e) => Err(PipelineError::Io(e)),
            };
            let outcome = match result {
                Ok(fields) => SlipOutcome::Parsed(fields),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "slip could not be read");
                    SlipOutcome::Failed { reason: e.to_string() }
                }
            };

            progress.report(&slot.update(ScanStage::FileDone, completed_percent(index + 1, total)));
            scans.push(SlipScan { source: path.clone(), outcome });
        }

        let failed = scans.iter().filter(|s| s.outcome.is_failed()).count();
        tracing::info!(files = total, failed, "batch finished");
        progress.report(&ProgressUpdate {
            stage: ScanStage::BatchDone,
            file_index: total - 1,
            total_files: total,
            file_name: String::new(),
            percent: 100,
        });
        scans
    }

    async fn scan(
        &self,
        data: &[u8],
        slot: &FileSlot<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<SlipFields, PipelineError> {
        let PreparedSlip { full, primary } = preprocess::prepare_slip(data, &self.config)?;

        let mut fields = self.run_pass(primary, ScanStage::Primary, slot, progress).await?;
        if ScanPass::Primary.next(&fields) == ScanPass::Fallback {
            tracing::debug!(
                file = slot.name,
                has_amount = fields.amount.is_some(),
                has_memo = fields.memo.is_some(),
                "primary pass incomplete, reading full image"
            );
            let more = self.run_pass(full, ScanStage::Fallback, slot, progress).await?;
            fields.fill_missing(more);
        }
        Ok(fields)
    }

    async fn run_pass(
        &self,
        png: Vec<u8>,
        stage: ScanStage,
        slot: &FileSlot<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<SlipFields, PipelineError> {
        let weight = match stage {
            ScanStage::Fallback => self.config.fallback_progress,
            _ => self.config.primary_progress,
        };
        tracing::debug!(file = slot.name, ?stage, "starting OCR pass");
        progress.report(&slot.update(stage, batch_percent(slot.index, slot.total, weight.offset)));

        // Events cross back from the blocking thread; the channel closes when
        // recognition returns.
        let (events, mut received) = tokio::sync::mpsc::unbounded_channel::<RecognitionEvent>();
        let task = tokio::task::spawn_blocking({
            let recognizer = Arc::clone(&self.recognizer);
            let language = self.config.language.clone();
            move || {
                let mut on_event = |event: RecognitionEvent| {
                    let _ = events.send(event);
                };
                recognizer.recognize(&png, &language, &mut on_event)
            }
        });

        while let Some(event) = received.recv().await {
            if event.status != RECOGNIZING_TEXT {
                continue;
            }
            let local = weight.apply(event.progress);
            progress.report(&slot.update(stage, batch_percent(slot.index, slot.total, local)));
        }

        let text = task.await??;
        Ok(Extractor::parse(&text))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
