use std::path::PathBuf;
use std::process;

use clap::Parser;

use facescrub_core::detection::domain::detection_params::DetectionParams;
use facescrub_core::detection::domain::face_detector::FaceDetector;
use facescrub_core::detection::infrastructure::haar_cascade_detector::HaarCascadeDetector;
use facescrub_core::error::ScrubError;
use facescrub_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facescrub_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facescrub_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facescrub_core::pipeline::{directory_scanner, output_preparer};
use facescrub_core::pipeline::redact_folder_use_case::RedactFolderUseCase;
use facescrub_core::pipeline::redact_image_use_case::RedactImageUseCase;
use facescrub_core::redaction::infrastructure::solid_fill_redactor::SolidFillRedactor;
use facescrub_core::shared::constants::{
    CASCADE_MODEL_NAME, CASCADE_MODEL_URL, DEFAULT_MIN_NEIGHBORS, DEFAULT_MIN_SIZE,
    DEFAULT_SCALE_FACTOR, SYSTEM_CASCADE_DIRS,
};
use facescrub_core::shared::model_resolver::{self, ModelSource};

/// Black out faces in every PNG/JPEG image of a folder.
#[derive(Parser)]
#[command(name = "facescrub")]
struct Cli {
    /// Folder with the images to redact (usually "input").
    input_folder: PathBuf,

    /// Folder the redacted copies are written to (usually "output").
    output_folder: PathBuf,

    /// Pyramid step between detection passes (must be > 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Overlapping hits a face needs before it is kept.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: u32,

    /// Smallest face size in pixels (square).
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE)]
    min_size: u32,

    /// Cascade XML to use instead of looking one up.
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Download the cascade into the user cache if no local copy is found.
    #[arg(long)]
    download_model: bool,

    /// Stop at the first image that fails instead of skipping it.
    #[arg(long)]
    fail_fast: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let params = validate(&cli)?;

    // Input and output problems are reported before the model is looked up.
    let entries = directory_scanner::scan(&cli.input_folder)?;
    output_preparer::prepare(&cli.output_folder)?;
    if entries.is_empty() {
        log::info!("No images found in {}", cli.input_folder.display());
        println!("Face removal completed!");
        return Ok(());
    }

    let detector = build_detector(&cli, params)?;
    let image = RedactImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        detector,
        Box::new(SolidFillRedactor::default()),
    );
    let mut use_case = RedactFolderUseCase::new(image, Box::new(StdoutPipelineLogger::new()))
        .with_fail_fast(cli.fail_fast);

    use_case.redact_entries(entries, &cli.output_folder)?;
    println!("Face removal completed!");
    use_case.logger().summary();
    Ok(())
}

fn build_detector(
    cli: &Cli,
    params: DetectionParams,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let cascade_path = match &cli.cascade {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {CASCADE_MODEL_NAME}");
            let source = ModelSource {
                name: CASCADE_MODEL_NAME,
                url: CASCADE_MODEL_URL,
                search_dirs: SYSTEM_CASCADE_DIRS,
                allow_download: cli.download_model,
            };
            let path = model_resolver::resolve(&source, Some(Box::new(download_progress)))
                .map_err(|e| ScrubError::ModelUnavailable(Box::new(e)))?;
            if cli.download_model {
                eprintln!();
            }
            path
        }
    };

    Ok(Box::new(HaarCascadeDetector::from_file(
        &cascade_path,
        params,
    )?))
}

fn validate(cli: &Cli) -> Result<DetectionParams, ScrubError> {
    if cli.min_size == 0 {
        return Err(ScrubError::InvalidParams(
            "min size must be at least 1 pixel".into(),
        ));
    }
    let params = DetectionParams {
        scale_factor: cli.scale_factor,
        min_neighbors: cli.min_neighbors,
        min_size: (cli.min_size, cli.min_size),
        max_size: None,
    };
    params.validate().map_err(ScrubError::InvalidParams)?;
    Ok(params)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
