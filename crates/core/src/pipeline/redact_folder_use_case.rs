use std::path::Path;

use crate::error::ScrubError;
use crate::pipeline::batch_report::{BatchReport, FailedFile, ProcessedFile};
use crate::pipeline::directory_scanner::{self, FileEntry};
use crate::pipeline::output_preparer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::redact_image_use_case::RedactImageUseCase;

/// Folder pipeline: scan → prepare output → redact each image in name order.
///
/// Per-file failures are recorded in the report and the run moves on.
/// With `fail_fast` the first one aborts the run instead.
pub struct RedactFolderUseCase {
    image: RedactImageUseCase,
    logger: Box<dyn PipelineLogger>,
    fail_fast: bool,
}

impl RedactFolderUseCase {
    pub fn new(image: RedactImageUseCase, logger: Box<dyn PipelineLogger>) -> Self {
        Self {
            image,
            logger,
            fail_fast: false,
        }
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn execute(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchReport, ScrubError> {
        // Scan before touching the output so a bad input leaves no trace.
        let entries = directory_scanner::scan(input_dir)?;
        output_preparer::prepare(output_dir)?;
        self.redact_entries(entries, output_dir)
    }

    /// Redacts already-scanned `entries` into an existing `output_dir`.
    pub fn redact_entries(
        &mut self,
        entries: Vec<FileEntry>,
        output_dir: &Path,
    ) -> Result<BatchReport, ScrubError> {
        let mut report = BatchReport::default();
        for entry in entries {
            let output_path = output_dir.join(&entry.file_name);
            match self.image.execute(&entry.path, &output_path) {
                Ok(outcome) => {
                    for (stage, ms) in &outcome.timings {
                        self.logger.timing(stage, *ms);
                    }
                    self.logger
                        .file_processed(&entry.path, &output_path, outcome.faces);
                    report.processed.push(ProcessedFile {
                        input: entry.path,
                        output: output_path,
                        faces: outcome.faces,
                    });
                }
                Err(e) if self.fail_fast || !e.is_per_file() => return Err(e),
                Err(e) => {
                    self.logger.file_failed(&entry.path, &e);
                    report.failed.push(FailedFile {
                        input: entry.path,
                        error: e,
                    });
                }
            }
        }

        log::info!(
            "Redacted {} face(s) across {} file(s), {} failed",
            report.total_faces(),
            report.processed.len(),
            report.failed.len()
        );
        Ok(report)
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
    use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
    use crate::pipeline::redact_image_use_case::test_support::*;
    use crate::redaction::infrastructure::solid_fill_redactor::SolidFillRedactor;
    use crate::shared::bounding_box::BoundingBox;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Events {
        processed: Vec<(PathBuf, PathBuf, usize)>,
        failed: Vec<PathBuf>,
        stages: Vec<String>,
    }

    struct RecordingLogger(Arc<Mutex<Events>>);

    impl PipelineLogger for RecordingLogger {
        fn file_processed(&mut self, input: &Path, output: &Path, faces: usize) {
            self.0.lock().unwrap().processed.push((
                input.to_path_buf(),
                output.to_path_buf(),
                faces,
            ));
        }

        fn file_failed(&mut self, input: &Path, _error: &ScrubError) {
            self.0.lock().unwrap().failed.push(input.to_path_buf());
        }

        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.0.lock().unwrap().stages.push(stage.to_string());
        }
    }

    struct Fixture {
        tmp: TempDir,
        input: PathBuf,
        output: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let input = tmp.path().join("input");
            let output = tmp.path().join("output");
            fs::create_dir(&input).unwrap();
            Self { tmp, input, output }
        }

        fn touch(&self, name: &str) -> PathBuf {
            let path = self.input.join(name);
            fs::write(&path, b"placeholder").unwrap();
            path
        }
    }

    /// Builds a stub-backed use case; files listed in `decodable` decode to a
    /// 10x10 frame, every other file fails to decode.
    fn stub_use_case(
        decodable: &[PathBuf],
        faces: Vec<BoundingBox>,
        writer: StubImageWriter,
    ) -> (RedactFolderUseCase, Arc<Mutex<Events>>) {
        let frames: HashMap<PathBuf, _> = decodable
            .iter()
            .map(|p| (p.clone(), make_frame(10, 10)))
            .collect();
        let image = RedactImageUseCase::new(
            Box::new(StubImageReader { frames }),
            Box::new(writer),
            Box::new(StubDetector::new(faces)),
            Box::new(SolidFillRedactor::default()),
        );
        let events = Arc::new(Mutex::new(Events::default()));
        let logger = RecordingLogger(events.clone());
        (RedactFolderUseCase::new(image, Box::new(logger)), events)
    }

    #[test]
    fn test_empty_input_creates_output_and_reports_nothing() {
        let fx = Fixture::new();
        let (mut uc, events) = stub_use_case(&[], vec![], StubImageWriter::new());

        let report = uc.execute(&fx.input, &fx.output).unwrap();

        assert!(fx.output.is_dir());
        assert_eq!(fs::read_dir(&fx.output).unwrap().count(), 0);
        assert!(report.processed.is_empty());
        assert!(report.is_clean());
        assert!(events.lock().unwrap().processed.is_empty());
    }

    #[test]
    fn test_processes_supported_files_in_name_order() {
        let fx = Fixture::new();
        let b = fx.touch("b.png");
        let a = fx.touch("a.jpg");
        fx.touch("notes.txt");
        fx.touch("c.gif");
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let (mut uc, events) = stub_use_case(
            &[a.clone(), b.clone()],
            vec![BoundingBox::new(1, 1, 2, 2)],
            writer,
        );

        let report = uc.execute(&fx.input, &fx.output).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            events.processed,
            vec![
                (a.clone(), fx.output.join("a.jpg"), 1),
                (b.clone(), fx.output.join("b.png"), 1),
            ]
        );
        assert_eq!(
            events.stages,
            vec!["decode", "detect", "redact", "encode"].repeat(2)
        );
        let written: Vec<_> = written.lock().unwrap().iter().map(|w| w.0.clone()).collect();
        assert_eq!(written, vec![fx.output.join("a.jpg"), fx.output.join("b.png")]);
        assert_eq!(report.total_faces(), 2);
    }

    #[test]
    fn test_bad_file_is_isolated() {
        let fx = Fixture::new();
        let a = fx.touch("a.png");
        let bad = fx.touch("bad.png");
        let c = fx.touch("c.png");
        let (mut uc, events) =
            stub_use_case(&[a.clone(), c.clone()], vec![], StubImageWriter::new());

        let report = uc.execute(&fx.input, &fx.output).unwrap();

        assert_eq!(report.processed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].input, bad);
        assert!(matches!(
            report.failed[0].error,
            ScrubError::DecodeFailed { .. }
        ));
        assert_eq!(events.lock().unwrap().failed, vec![bad]);
    }

    #[test]
    fn test_fail_fast_aborts_on_first_bad_file() {
        let fx = Fixture::new();
        let a = fx.touch("a.png");
        fx.touch("bad.png");
        let c = fx.touch("c.png");
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let (uc, events) = stub_use_case(&[a, c], vec![], writer);
        let mut uc = uc.with_fail_fast(true);

        let err = uc.execute(&fx.input, &fx.output).unwrap_err();

        assert!(matches!(err, ScrubError::DecodeFailed { .. }));
        assert_eq!(written.lock().unwrap().len(), 1);
        assert!(events.lock().unwrap().failed.is_empty());
    }

    #[test]
    fn test_encode_failure_is_isolated() {
        let fx = Fixture::new();
        let a = fx.touch("a.png");
        let mut writer = StubImageWriter::new();
        writer.fail = true;
        let (mut uc, _events) = stub_use_case(&[a], vec![], writer);

        let report = uc.execute(&fx.input, &fx.output).unwrap();

        assert!(report.processed.is_empty());
        assert!(matches!(
            report.failed[0].error,
            ScrubError::EncodeFailed { .. }
        ));
    }

    #[test]
    fn test_missing_input_does_not_create_output() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("missing");
        let output = tmp.path().join("output");
        let (mut uc, _events) = stub_use_case(&[], vec![], StubImageWriter::new());

        let err = uc.execute(&input, &output).unwrap_err();

        assert!(matches!(err, ScrubError::InputNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        let fx = Fixture::new();
        fx.touch("a.png");
        let blocker = fx.tmp.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let (mut uc, _events) = stub_use_case(&[], vec![], StubImageWriter::new());

        let err = uc.execute(&fx.input, &blocker.join("out")).unwrap_err();

        assert!(matches!(err, ScrubError::OutputDirectoryUnwritable { .. }));
    }

    fn real_use_case(faces: Vec<BoundingBox>) -> RedactFolderUseCase {
        let image = RedactImageUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(StubDetector::new(faces)),
            Box::new(SolidFillRedactor::default()),
        );
        RedactFolderUseCase::new(image, Box::new(crate::pipeline::pipeline_logger::NullPipelineLogger))
    }

    fn write_gradient_png(path: &Path) -> image::RgbImage {
        let img = image::RgbImage::from_fn(16, 12, |x, y| {
            image::Rgb([(x * 10) as u8, (y * 20) as u8, 77])
        });
        img.save(path).unwrap();
        img
    }

    #[test]
    fn test_zero_faces_output_is_pixel_identical() {
        let fx = Fixture::new();
        let original = write_gradient_png(&fx.input.join("b.png"));
        let mut uc = real_use_case(vec![]);

        uc.execute(&fx.input, &fx.output).unwrap();

        let out = image::open(fx.output.join("b.png")).unwrap().into_rgb8();
        assert_eq!(out, original);
    }

    #[test]
    fn test_face_region_is_black_and_rest_untouched() {
        let fx = Fixture::new();
        let original = write_gradient_png(&fx.input.join("a.png"));
        let face = BoundingBox::new(4, 3, 5, 6);
        let mut uc = real_use_case(vec![face]);

        uc.execute(&fx.input, &fx.output).unwrap();

        let out = image::open(fx.output.join("a.png")).unwrap().into_rgb8();
        for (x, y, px) in out.enumerate_pixels() {
            if face.contains(x, y) {
                assert_eq!(px.0, [0, 0, 0], "({x},{y}) should be black");
            } else {
                assert_eq!(px, original.get_pixel(x, y), "({x},{y}) changed");
            }
        }
    }

    #[test]
    fn test_second_run_produces_same_output() {
        let fx = Fixture::new();
        write_gradient_png(&fx.input.join("a.png"));
        let mut uc = real_use_case(vec![BoundingBox::new(0, 0, 3, 3)]);

        uc.execute(&fx.input, &fx.output).unwrap();
        let first = fs::read(fx.output.join("a.png")).unwrap();
        uc.execute(&fx.input, &fx.output).unwrap();
        let second = fs::read(fx.output.join("a.png")).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_dir(&fx.output).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_image_with_matching_extension_is_isolated() {
        let fx = Fixture::new();
        write_gradient_png(&fx.input.join("a.png"));
        fs::write(fx.input.join("bad.png"), b"definitely not a png").unwrap();
        write_gradient_png(&fx.input.join("c.png"));
        let mut uc = real_use_case(vec![]);

        let report = uc.execute(&fx.input, &fx.output).unwrap();

        assert_eq!(report.processed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(!fx.output.join("bad.png").exists());
        assert!(fx.output.join("c.png").exists());
    }

    #[test]
    fn test_redact_entries_skips_scanning() {
        let fx = Fixture::new();
        let a = fx.touch("a.png");
        fx.touch("b.png");
        fs::create_dir(&fx.output).unwrap();
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let (mut uc, _events) = stub_use_case(&[a.clone()], vec![], writer);
        let entries = vec![FileEntry {
            file_name: "a.png".into(),
            path: a,
        }];

        let report = uc.redact_entries(entries, &fx.output).unwrap();

        assert_eq!(report.processed.len(), 1);
        assert!(report.is_clean());
        assert_eq!(written.lock().unwrap()[0].0, fx.output.join("a.png"));
    }
}
