use std::path::Path;
use std::time::Instant;

use crate::detection::domain::face_detector::FaceDetector;
use crate::error::ScrubError;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::redaction::domain::frame_redactor::FrameRedactor;

/// What happened to one image.
#[derive(Clone, Debug, PartialEq)]
pub struct RedactionOutcome {
    pub faces: usize,
    /// `(stage, milliseconds)` in pipeline order.
    pub timings: Vec<(&'static str, f64)>,
}

/// Single-image pipeline: read → grayscale → detect → redact → write.
///
/// Detection runs on a grayscale copy; the original color frame is what
/// gets redacted and written.
pub struct RedactImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    detector: Box<dyn FaceDetector>,
    redactor: Box<dyn FrameRedactor>,
}

impl RedactImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        detector: Box<dyn FaceDetector>,
        redactor: Box<dyn FrameRedactor>,
    ) -> Self {
        Self {
            reader,
            writer,
            detector,
            redactor,
        }
    }

    pub fn execute(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<RedactionOutcome, ScrubError> {
        let mut timings = Vec::with_capacity(4);
        let mut clock = Instant::now();
        let mut lap = |stage: &'static str, timings: &mut Vec<(&'static str, f64)>| {
            timings.push((stage, clock.elapsed().as_secs_f64() * 1000.0));
            clock = Instant::now();
        };

        let mut frame = self
            .reader
            .read(input_path)
            .map_err(|e| ScrubError::DecodeFailed {
                path: input_path.to_path_buf(),
                source: e,
            })?;
        lap("decode", &mut timings);

        let gray = frame.to_gray();
        let boxes = self
            .detector
            .detect(&gray)
            .map_err(|e| ScrubError::DetectionFailed {
                path: input_path.to_path_buf(),
                source: e,
            })?;
        lap("detect", &mut timings);

        self.redactor
            .redact(&mut frame, &boxes)
            .map_err(|e| ScrubError::DetectionFailed {
                path: input_path.to_path_buf(),
                source: e,
            })?;
        lap("redact", &mut timings);

        self.writer
            .write(output_path, &frame)
            .map_err(|e| ScrubError::EncodeFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;
        lap("encode", &mut timings);

        Ok(RedactionOutcome {
            faces: boxes.len(),
            timings,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::redaction::infrastructure::solid_fill_redactor::SolidFillRedactor;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::frame::Frame;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn reader_with(path: &str, frame: Frame) -> Box<StubImageReader> {
        Box::new(StubImageReader {
            frames: HashMap::from([(PathBuf::from(path), frame)]),
        })
    }

    #[test]
    fn test_passes_boxes_to_redactor() {
        let redactor = RecordingRedactor::new();
        let calls = redactor.calls.clone();
        let face = BoundingBox::new(10, 10, 30, 30);

        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(100, 100)),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector::new(vec![face])),
            Box::new(redactor),
        );

        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        assert_eq!(outcome.faces, 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![face]);
    }

    #[test]
    fn test_detector_sees_grayscale_of_input() {
        let detector = StubDetector::new(vec![]);
        let seen = detector.seen.clone();
        let frame = Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 3);

        let uc = RedactImageUseCase::new(
            reader_with("in.png", frame),
            Box::new(StubImageWriter::new()),
            Box::new(detector),
            Box::new(RecordingRedactor::new()),
        );
        uc.execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].data(), &[76, 29]);
    }

    #[test]
    fn test_color_frame_is_redacted_and_written() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let face = BoundingBox::new(2, 2, 3, 3);

        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(10, 10)),
            Box::new(writer),
            Box::new(StubDetector::new(vec![face])),
            Box::new(SolidFillRedactor::default()),
        );
        uc.execute(Path::new("in.png"), Path::new("out/in.png"))
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out/in.png"));
        let out = &written[0].1;
        assert_eq!(out.channels(), 3);
        assert_eq!(out.pixel(3, 3), &[0, 0, 0]);
        assert_eq!(out.pixel(0, 0), &[128, 128, 128]);
    }

    #[test]
    fn test_no_faces_writes_identical_frame() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let frame = make_frame(20, 15);

        let uc = RedactImageUseCase::new(
            reader_with("in.png", frame.clone()),
            Box::new(writer),
            Box::new(StubDetector::new(vec![])),
            Box::new(SolidFillRedactor::default()),
        );
        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        assert_eq!(outcome.faces, 0);
        assert_eq!(written.lock().unwrap()[0].1, frame);
    }

    #[test]
    fn test_records_stage_timings_in_order() {
        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(4, 4)),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector::new(vec![])),
            Box::new(RecordingRedactor::new()),
        );
        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();
        let stages: Vec<_> = outcome.timings.iter().map(|(s, _)| *s).collect();
        assert_eq!(stages, vec!["decode", "detect", "redact", "encode"]);
        assert!(outcome.timings.iter().all(|(_, ms)| *ms >= 0.0));
    }

    #[test]
    fn test_unreadable_input_is_decode_failed() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(4, 4)),
            Box::new(writer),
            Box::new(StubDetector::new(vec![])),
            Box::new(RecordingRedactor::new()),
        );
        let err = uc
            .execute(Path::new("other.png"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(err, ScrubError::DecodeFailed { .. }));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detector_error_is_detection_failed() {
        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(4, 4)),
            Box::new(StubImageWriter::new()),
            Box::new(FailingDetector),
            Box::new(RecordingRedactor::new()),
        );
        let err = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(err, ScrubError::DetectionFailed { .. }));
    }

    #[test]
    fn test_writer_error_is_encode_failed() {
        let mut writer = StubImageWriter::new();
        writer.fail = true;
        let uc = RedactImageUseCase::new(
            reader_with("in.png", make_frame(4, 4)),
            Box::new(writer),
            Box::new(StubDetector::new(vec![])),
            Box::new(RecordingRedactor::new()),
        );
        let err = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(err, ScrubError::EncodeFailed { ref path, .. } if path == Path::new("out.png")));
    }
}
