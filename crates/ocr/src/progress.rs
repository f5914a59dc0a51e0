use serde::Serialize;

/// Which step of a batch a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    Primary,
    Fallback,
    FileDone,
    BatchDone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub stage: ScanStage,
    /// Zero-based index of the file being read.
    pub file_index: usize,
    pub total_files: usize,
    pub file_name: String,
    /// Whole-batch progress, 0–100.
    pub percent: u8,
}

impl ProgressUpdate {
    /// Status line shown to the user.
    pub fn message(&self) -> String {
        let n = self.file_index + 1;
        match self.stage {
            ScanStage::Primary => {
                format!("กำลังอ่านสลิป {n}/{}: {}", self.total_files, self.file_name)
            }
            ScanStage::Fallback => {
                format!("กำลังเก็บข้อมูลเพิ่ม {n}/{}: {}", self.total_files, self.file_name)
            }
            ScanStage::FileDone => format!("อ่านแล้ว {n}/{} สลิป", self.total_files),
            ScanStage::BatchDone => format!("อ่านครบ {} สลิปแล้ว", self.total_files),
        }
    }
}

/// Observer for batch progress. Updates may arrive zero or more times per pass.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Discards every update.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _update: &ProgressUpdate) {}
}

/// Batch percent for a file-local fraction of work on file `file_index`.
pub fn batch_percent(file_index: usize, total_files: usize, local: f32) -> u8 {
    let local = if local.is_nan() { 0.0 } else { f64::from(local.clamp(0.0, 1.0)) };
    let each = 100.0 / total_files.max(1) as f64;
    (file_index as f64 * each + local * each).round().clamp(0.0, 100.0) as u8
}

/// Batch percent once `done` files have finished.
pub fn completed_percent(done: usize, total_files: usize) -> u8 {
    (done as f64 / total_files.max(1) as f64 * 100.0).round().clamp(0.0, 100.0) as u8
}
