//! Run configuration and the fixed COCO 2017 directory layout.
//!
//! An [`ExtractConfig`] is built once (normally from the command line),
//! validated, and then passed by reference to every stage.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ExtractError;

/// One of the three dataset partitions, processed in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    /// Output directory and manifest name.
    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }

    /// Suffix used by the source layout (`instances_<stem>.json`, `images/<stem>/`).
    pub fn source_stem(&self) -> &'static str {
        match self {
            Split::Train => "train2017",
            Split::Valid => "val2017",
            Split::Test => "test2017",
        }
    }

    /// Test images are copied but never labelled.
    pub fn is_labelled(&self) -> bool {
        !matches!(self, Split::Test)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which label files are produced for train/valid images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    /// `labels/<stem>.txt` with normalized YOLO rows.
    Yolo,
    /// `annotations/<stem>.json` with the image's raw COCO records.
    ReducedCoco,
}

impl LabelFormat {
    pub fn dir_name(&self) -> &'static str {
        match self {
            LabelFormat::Yolo => "labels",
            LabelFormat::ReducedCoco => "annotations",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            LabelFormat::Yolo => "txt",
            LabelFormat::ReducedCoco => "json",
        }
    }
}

/// Immutable parameters for one extraction run.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Root of the source dataset (`annotations/` + `images/`).
    pub dataset_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Ordered class names to keep; empty keeps every image and class.
    pub target_classes: Vec<String>,
    /// Background images to add, as a ratio of the number of target images
    /// (0.5 adds roughly one background image per two target images).
    pub background_percentage: f64,
    /// Cap on the number of test images, sampled uniformly at random.
    pub test_num_images: Option<usize>,
    /// Restrict the test split to images containing a target class.
    pub test_only_target_classes: bool,
    /// Name of the merged class when all targets collapse into one.
    pub single_class_name: Option<String>,
    pub label_format: LabelFormat,
    /// Seed for test-split sampling; `None` draws from the thread RNG.
    pub seed: Option<u64>,
    pub show_progress: bool,
}

impl ExtractConfig {
    /// Creates a configuration with the documented defaults.
    pub fn new(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            output_dir: PathBuf::from("new_dataset"),
            target_classes: Vec::new(),
            background_percentage: 0.0,
            test_num_images: None,
            test_only_target_classes: false,
            single_class_name: None,
            label_format: LabelFormat::Yolo,
            seed: None,
            show_progress: false,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_target_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_background_percentage(mut self, ratio: f64) -> Self {
        self.background_percentage = ratio;
        self
    }

    pub fn with_test_num_images(mut self, cap: usize) -> Self {
        self.test_num_images = Some(cap);
        self
    }

    pub fn with_test_only_target_classes(mut self, enabled: bool) -> Self {
        self.test_only_target_classes = enabled;
        self
    }

    pub fn with_single_class(mut self, name: impl Into<String>) -> Self {
        self.single_class_name = Some(name.into());
        self
    }

    pub fn with_label_format(mut self, format: LabelFormat) -> Self {
        self.label_format = format;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects parameter values no stage can act on.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if !self.background_percentage.is_finite() || self.background_percentage < 0.0 {
            return Err(ExtractError::InvalidConfig {
                message: format!(
                    "background_percentage must be a finite number >= 0, got {}",
                    self.background_percentage
                ),
            });
        }

        if self.test_num_images == Some(0) {
            return Err(ExtractError::InvalidConfig {
                message: "test_num_images must be greater than 0".to_string(),
            });
        }

        if let Some(name) = &self.single_class_name {
            if name.trim().is_empty() {
                return Err(ExtractError::InvalidConfig {
                    message: "single_class_name must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn is_filtering(&self) -> bool {
        !self.target_classes.is_empty()
    }

    /// `<dataset_dir>/annotations/instances_<stem>.json`
    pub fn annotation_file(&self, split: Split) -> PathBuf {
        self.dataset_dir
            .join("annotations")
            .join(format!("instances_{}.json", split.source_stem()))
    }

    /// `<dataset_dir>/images/<stem>`
    pub fn image_dir(&self, split: Split) -> PathBuf {
        self.dataset_dir.join("images").join(split.source_stem())
    }

    /// `<output_dir>/<split>`
    pub fn split_output_dir(&self, split: Split) -> PathBuf {
        self.output_dir.join(split.name())
    }

    /// `<output_dir>/<split>.txt`
    pub fn manifest_path(&self, split: Split) -> PathBuf {
        self.output_dir.join(format!("{}.txt", split.name()))
    }
}

/// The final path component of an image's `file_name`.
///
/// Images are copied flat into `<split>/images/`, so nested source names
/// collapse to their base name.
pub fn image_base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name)
}

/// Manifest entry for an image: `<split>/images/<base name>`.
pub fn manifest_entry(split: Split, file_name: &str) -> String {
    format!("{}/images/{}", split.name(), image_base_name(file_name))
}

/// Label file name: the image's base name with its extension replaced.
pub fn label_file_name(file_name: &str, format: LabelFormat) -> PathBuf {
    PathBuf::from(image_base_name(file_name)).with_extension(format.extension())
}
