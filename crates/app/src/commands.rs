use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Args;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use slipread_core::ScanConfig;
use slipread_import::{default_export_name, export_csv, import_sheet, render_table, SlipSheet};
use slipread_ocr::{
    is_supported_image, OcrBackend, ProgressSink, ProgressUpdate, ScanStage, SlipPipeline, SlipScan,
    TesseractCommand,
};

use crate::Engine;

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print per-file outcomes as JSON instead of the table
    #[arg(long)]
    pub json: bool,

    /// Write the table to this CSV file
    #[arg(long, conflicts_with = "export")]
    pub out: Option<PathBuf>,

    /// Write the table to slip-results-<timestamp>.csv in the current directory
    #[arg(long)]
    pub export: bool,
}

impl OutputArgs {
    fn export_path(&self) -> Option<PathBuf> {
        match (&self.out, self.export) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => {
                let name = default_export_name(chrono::Local::now().naive_local());
                Some(PathBuf::from(name))
            }
            (None, false) => None,
        }
    }
}

pub struct ScanArgs {
    pub files: Vec<PathBuf>,
    pub append: Option<PathBuf>,
    pub engine: Engine,
    pub tesseract: PathBuf,
    pub tessdata: Option<String>,
    pub output: OutputArgs,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => {
            ScanConfig::load(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(ScanConfig::default()),
    }
}

/// Split inputs into readable images and everything else.
fn partition_images(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    files.into_iter().partition(|p| is_supported_image(p))
}

/// Number scan results after whatever the sheet already holds.
fn append_scans(sheet: &mut SlipSheet, scans: &[SlipScan]) {
    for scan in scans {
        sheet.push(scan.outcome.amount_display(), scan.outcome.memo_display());
    }
}

/// Batch progress as one bar on stderr, measured in percent.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn stderr() -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr_with_hz(12));
        bar.enable_steady_tick(Duration::from_millis(120));
        Self::with_bar(bar)
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(100);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{elapsed_precise}] {bar:30} {pos:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn report(&self, update: &ProgressUpdate) {
        self.bar.set_position(u64::from(update.percent));
        if update.stage == ScanStage::BatchDone {
            self.bar.finish_with_message(update.message());
        } else {
            self.bar.set_message(update.message());
        }
    }
}

pub async fn scan(config: ScanConfig, args: ScanArgs) -> anyhow::Result<()> {
    config.validate()?;

    let (images, skipped) = partition_images(args.files);
    for path in &skipped {
        tracing::warn!(file = %path.display(), "not an image, skipping");
    }
    if images.is_empty() {
        bail!("no image files to scan");
    }

    let mut sheet = match &args.append {
        Some(path) => {
            let sheet =
                import_sheet(path).with_context(|| format!("importing {}", path.display()))?;
            eprintln!("นำเข้าสำเร็จ ({} แถว)", sheet.len());
            sheet
        }
        None => SlipSheet::new(),
    };

    let scans = match args.engine {
        Engine::Cli => run(TesseractCommand::with_program(&args.tesseract), config, &images).await,
        Engine::Lib => run_library(args.tessdata.clone(), config, &images).await?,
    };
    append_scans(&mut sheet, &scans);

    if args.output.json {
        println!("{}", serde_json::to_string_pretty(&scans)?);
    } else {
        print!("{}", render_table(sheet.rows()));
    }
    write_export(&sheet, &args.output)
}

async fn run<R: OcrBackend + 'static>(
    recognizer: R,
    config: ScanConfig,
    images: &[PathBuf],
) -> Vec<SlipScan> {
    let pipeline = SlipPipeline::new(recognizer, config);
    pipeline.run_batch(images, &BarProgress::stderr()).await
}

#[cfg(feature = "tesseract")]
async fn run_library(
    tessdata: Option<String>,
    config: ScanConfig,
    images: &[PathBuf],
) -> anyhow::Result<Vec<SlipScan>> {
    use slipread_ocr::recognizer::tesseract_backend::TesseractRecognizer;

    Ok(run(TesseractRecognizer::new(tessdata), config, images).await)
}

#[cfg(not(feature = "tesseract"))]
async fn run_library(
    _tessdata: Option<String>,
    _config: ScanConfig,
    _images: &[PathBuf],
) -> anyhow::Result<Vec<SlipScan>> {
    bail!(
        "this build has no in-process engine; rebuild with `--features tesseract` or use `--engine cli`"
    )
}

pub fn import(path: &Path, drop_rows: &[usize], output: &OutputArgs) -> anyhow::Result<()> {
    let mut sheet = import_sheet(path).with_context(|| format!("importing {}", path.display()))?;
    eprintln!("นำเข้าสำเร็จ ({} แถว)", sheet.len());

    if !drop_rows.is_empty() {
        let removed = sheet.remove_orders(drop_rows);
        eprintln!("ลบแล้ว {removed} แถว");
    }

    if output.json {
        println!("{}", serde_json::to_string_pretty(sheet.rows())?);
    } else {
        print!("{}", render_table(sheet.rows()));
    }
    write_export(&sheet, output)
}

fn write_export(sheet: &SlipSheet, output: &OutputArgs) -> anyhow::Result<()> {
    let Some(path) = output.export_path() else {
        return Ok(());
    };
    if sheet.is_empty() {
        eprintln!("ยังไม่มีข้อมูลในตารางสำหรับ Export");
        return Ok(());
    }
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    export_csv(BufWriter::new(file), sheet.rows())?;
    eprintln!("Export สำเร็จ ({} แถว): {}", sheet.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipread_core::Baht;
    use slipread_ocr::{SlipFields, SlipOutcome};

    #[test]
    fn only_images_are_scanned() {
        let files = vec![PathBuf::from("a.png"), PathBuf::from("notes.txt"), PathBuf::from("b.JPG")];
        let (images, skipped) = partition_images(files);
        assert_eq!(images, vec![PathBuf::from("a.png"), PathBuf::from("b.JPG")]);
        assert_eq!(skipped, vec![PathBuf::from("notes.txt")]);
    }

    #[test]
    fn scans_are_numbered_after_imported_rows() {
        let mut sheet = SlipSheet::new();
        sheet.push("100.00 บาท", "มัดจำ");
        let scans = vec![
            SlipScan {
                source: "a.png".into(),
                outcome: SlipOutcome::Parsed(SlipFields { amount: Baht::parse("1250"), memo: None }),
            },
            SlipScan { source: "b.png".into(), outcome: SlipOutcome::Failed { reason: "boom".into() } },
        ];
        append_scans(&mut sheet, &scans);

        let rows: Vec<(usize, &str, &str)> =
            sheet.rows().iter().map(|r| (r.order, r.amount.as_str(), r.memo.as_str())).collect();
        assert_eq!(
            rows,
            vec![(1, "100.00 บาท", "มัดจำ"), (2, "1,250.00 บาท", "-"), (3, "-", "อ่านไม่สำเร็จ")]
        );
    }

    fn update(stage: ScanStage, percent: u8) -> ProgressUpdate {
        ProgressUpdate { stage, file_index: 0, total_files: 2, file_name: "a.png".into(), percent }
    }

    #[test]
    fn bar_tracks_percent_and_finishes_on_batch_done() {
        let sink = BarProgress::with_bar(ProgressBar::hidden());
        assert_eq!(sink.bar.length(), Some(100));

        sink.report(&update(ScanStage::Primary, 41));
        assert_eq!(sink.bar.position(), 41);
        assert_eq!(sink.bar.message(), "กำลังอ่านสลิป 1/2: a.png");
        assert!(!sink.bar.is_finished());

        sink.report(&update(ScanStage::FileDone, 50));
        assert!(!sink.bar.is_finished());

        sink.report(&update(ScanStage::BatchDone, 100));
        assert_eq!(sink.bar.position(), 100);
        assert!(sink.bar.is_finished());
        assert_eq!(sink.bar.message(), "อ่านครบ 2 สลิปแล้ว");
    }

    #[test]
    fn explicit_out_path_wins() {
        let args = OutputArgs { out: Some("mine.csv".into()), ..Default::default() };
        assert_eq!(args.export_path(), Some(PathBuf::from("mine.csv")));
        assert_eq!(OutputArgs::default().export_path(), None);

        let generated = OutputArgs { export: true, ..Default::default() }.export_path().unwrap();
        let name = generated.to_string_lossy().into_owned();
        assert!(name.starts_with("slip-results-") && name.ends_with(".csv"), "{name}");
    }

    #[test]
    fn import_drops_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let out = dir.path().join("out.csv");
        std::fs::write(&input, "amount,memo\n1,a\n2,b\n3,c\n").unwrap();

        let output = OutputArgs { out: Some(out.clone()), ..Default::default() };
        import(&input, &[2], &output).unwrap();

        let back = import_sheet(&out).unwrap();
        let memos: Vec<&str> = back.rows().iter().map(|r| r.memo.as_str()).collect();
        assert_eq!(memos, vec!["a", "c"]);
        assert_eq!(back.rows()[1].order, 2);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/slipread.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), ScanConfig::default());
    }
}
