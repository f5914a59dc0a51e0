pub mod amount;
pub mod calendar;
pub mod extract;
pub mod hints;
pub mod memo;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod recognizer;
pub mod types;

pub use amount::extract_amount;
pub use calendar::correct_calendar_tokens;
pub use extract::{split_lines, Extractor};
pub use memo::extract_memo;
pub use pipeline::{PipelineError, ScanPass, SlipPipeline, SlipScan};
pub use preprocess::{
    is_supported_image, prepare_slip, PreparedSlip, PreprocessError, SUPPORTED_EXTENSIONS,
};
pub use progress::{NoProgress, ProgressSink, ProgressUpdate, ScanStage};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, RecognitionEvent, TesseractCommand};
pub use types::{SlipFields, SlipOutcome, MISSING_PLACEHOLDER, UNREADABLE_PLACEHOLDER};
