//! cocoslice: extract class-filtered subsets of COCO datasets.
//!
//! Given a COCO 2017 style tree (`annotations/instances_<split>2017.json`
//! plus `images/<split>2017/`), cocoslice keeps the images that contain the
//! requested classes, optionally adds background images that contain none
//! of them, and writes a new dataset with YOLO or reduced-COCO labels and
//! one manifest per split.
//!
//! # Modules
//!
//! - [`ir`]: COCO records, typed ids and boxes, COCO/YOLO readers and writers
//! - [`catalog`]: per-split indexed view of an annotation file, class resolution
//! - [`select`]: target/background partitioning and test-split sampling
//! - [`transcode`]: per-image label payloads
//! - [`materialize`]: writing a split to disk, per-split reports
//! - [`pipeline`]: the three-split run
//! - [`config`]: run configuration and directory layout
//! - [`error`]: error types
//!
//! # Example
//!
//! ```no_run
//! use cocoslice::config::ExtractConfig;
//! use cocoslice::materialize::FsCopier;
//! use cocoslice::pipeline::run_extraction;
//!
//! let config = ExtractConfig::new("/data/coco")
//!     .with_output_dir("cats_and_dogs")
//!     .with_target_classes(["cat", "dog"])
//!     .with_background_percentage(0.1);
//! let report = run_extraction(&config, &FsCopier)?;
//! print!("{report}");
//! # Ok::<(), cocoslice::ExtractError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod ir;
pub mod materialize;
pub mod pipeline;
pub mod select;
pub mod transcode;

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub use error::ExtractError;

use config::{ExtractConfig, LabelFormat};
use materialize::FsCopier;

/// The cocoslice CLI application.
#[derive(Parser)]
#[command(name = "cocoslice")]
#[command(version, about)]
struct Cli {
    /// Root of the COCO dataset (contains annotations/ and images/).
    #[arg(env = "COCOSLICE_DATASET_DIR")]
    dataset_dir: PathBuf,

    /// Directory the new dataset is written to.
    #[arg(
        long = "output_dir",
        alias = "output-dir",
        env = "COCOSLICE_OUTPUT_DIR",
        default_value = "new_dataset"
    )]
    output_dir: PathBuf,

    /// Class names to keep, in output index order. Empty keeps everything.
    #[arg(
        long = "target_classes",
        visible_alias = "names-list",
        alias = "target-classes",
        num_args = 1..
    )]
    target_classes: Vec<String>,

    /// Background images to add, as a ratio of the number of target images.
    #[arg(
        long = "background_percentage",
        alias = "background-percentage",
        default_value_t = 0.0
    )]
    background_percentage: f64,

    /// Randomly keep at most this many test images.
    #[arg(
        long = "test_num_images",
        alias = "test-num-images",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    test_num_images: Option<u64>,

    /// Only copy test images that contain a target class.
    #[arg(
        long = "test_only_target_classes",
        alias = "test-only-target-classes",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    test_only_target_classes: bool,

    /// Merge all target classes into a single class.
    #[arg(
        long = "create_single_class",
        alias = "create-single-class",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    create_single_class: bool,

    /// Name of the merged class.
    #[arg(
        long = "single_class_name",
        alias = "single-class-name",
        default_value = "new_class"
    )]
    single_class_name: String,

    /// Write YOLO labels (true) or reduced-COCO JSON (false).
    #[arg(
        long = "convert_to_yolo",
        alias = "convert-to-yolo",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    convert_to_yolo: bool,

    /// Seed for test-split sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Output format for the final report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,

    /// Hide progress bars.
    #[arg(long = "no_progress", alias = "no-progress")]
    no_progress: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl Cli {
    fn to_config(&self) -> ExtractConfig {
        let mut config = ExtractConfig::new(&self.dataset_dir)
            .with_output_dir(&self.output_dir)
            .with_target_classes(self.target_classes.iter().cloned())
            .with_background_percentage(self.background_percentage)
            .with_test_only_target_classes(self.test_only_target_classes)
            .with_label_format(if self.convert_to_yolo {
                LabelFormat::Yolo
            } else {
                LabelFormat::ReducedCoco
            });

        if let Some(cap) = self.test_num_images {
            config = config.with_test_num_images(usize::try_from(cap).unwrap_or(usize::MAX));
        }
        if self.create_single_class {
            config = config.with_single_class(self.single_class_name.clone());
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.show_progress = !self.no_progress;
        config
    }
}

/// Run the cocoslice CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ExtractError> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = cli.to_config();
    info!(
        dataset_dir = %config.dataset_dir.display(),
        output_dir = %config.output_dir.display(),
        target_classes = ?config.target_classes,
        background_percentage = config.background_percentage,
        test_num_images = ?config.test_num_images,
        test_only_target_classes = config.test_only_target_classes,
        single_class = ?config.single_class_name,
        label_format = ?config.label_format,
        "starting extraction"
    );

    let report = pipeline::run_extraction(&config, &FsCopier)?;

    match cli.report {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).map_err(ExtractError::ReportSerialize)?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Logs go to stderr so `--report json` output on stdout stays parseable.
/// `RUST_LOG` overrides the level chosen by `--debug`.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
