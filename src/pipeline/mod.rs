//! Runs the extraction over train, valid and test.
//!
//! Each split loads its own catalog; nothing is shared between splits
//! except the configuration and the class resolver, whose class list grows
//! as splits are loaded.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, ClassResolver};
use crate::config::{ExtractConfig, LabelFormat, Split};
use crate::error::ExtractError;
use crate::ir::io_yolo::{write_data_yaml, DataYaml};
use crate::materialize::{
    materialize_labelled_split, materialize_test_split, FileCopier, SplitIssueCode, SplitReport,
};
use crate::select::{list_image_dir, select_target_filenames, TestPool};

/// Outcome of a whole run.
#[derive(Clone, Debug, Serialize)]
pub struct ExtractionReport {
    pub output_dir: PathBuf,
    pub label_format: LabelFormat,
    pub splits: Vec<SplitReport>,
    /// Written in YOLO mode once a labelled split has been processed.
    pub data_yaml: Option<PathBuf>,
}

impl ExtractionReport {
    pub fn split(&self, split: Split) -> Option<&SplitReport> {
        self.splits.iter().find(|r| r.split == split)
    }

    pub fn images_copied(&self) -> usize {
        self.splits.iter().map(|r| r.counts.images_copied).sum()
    }
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Extracted {} images into {}",
            self.images_copied(),
            self.output_dir.display()
        )?;
        for split in &self.splits {
            write!(f, "{split}")?;
        }
        if let Some(path) = &self.data_yaml {
            writeln!(f, "Wrote {}", path.display())?;
        }
        Ok(())
    }
}

/// Extracts the configured subset of the dataset.
///
/// Missing inputs skip their split and are recorded in the report. Parse
/// and filesystem failures abort the run; files already written stay.
pub fn run_extraction(
    config: &ExtractConfig,
    copier: &dyn FileCopier,
) -> Result<ExtractionReport, ExtractError> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)?;

    let mut resolver = ClassResolver::from_config(config);
    let mut splits = Vec::with_capacity(Split::ALL.len());

    for split in Split::ALL {
        let report = if split.is_labelled() {
            run_labelled_split(config, split, &mut resolver, copier)?
        } else {
            run_test_split(config, &resolver, copier)?
        };
        splits.push(report);
    }

    let labelled_loaded = splits
        .iter()
        .any(|report| report.split.is_labelled() && !report.is_skipped());

    let data_yaml = match config.label_format {
        LabelFormat::Yolo if labelled_loaded => {
            let names = resolver.class_names();
            let root = fs::canonicalize(&config.output_dir)
                .unwrap_or_else(|_| config.output_dir.clone());
            let path = write_data_yaml(
                &config.output_dir,
                &DataYaml::new(root.display().to_string(), &names),
            )?;
            info!(path = %path.display(), classes = names.len(), "wrote dataset descriptor");
            Some(path)
        }
        _ => None,
    };

    Ok(ExtractionReport {
        output_dir: config.output_dir.clone(),
        label_format: config.label_format,
        splits,
        data_yaml,
    })
}

fn run_labelled_split(
    config: &ExtractConfig,
    split: Split,
    resolver: &mut ClassResolver,
    copier: &dyn FileCopier,
) -> Result<SplitReport, ExtractError> {
    let annotation_file = config.annotation_file(split);
    let Some(mut catalog) = load_catalog(split, &annotation_file)? else {
        return Ok(missing_annotations(split, &annotation_file));
    };

    resolver.ensure_merged_category(&mut catalog);
    resolver.register_categories(&catalog);

    materialize_labelled_split(config, split, &catalog, resolver, copier)
}

fn run_test_split(
    config: &ExtractConfig,
    resolver: &ClassResolver,
    copier: &dyn FileCopier,
) -> Result<SplitReport, ExtractError> {
    let split = Split::Test;

    let catalog = if config.test_only_target_classes {
        let annotation_file = config.annotation_file(split);
        let Some(catalog) = load_catalog(split, &annotation_file)? else {
            return Ok(missing_annotations(split, &annotation_file));
        };
        Some(catalog)
    } else {
        None
    };

    let image_dir = config.image_dir(split);
    if !image_dir.is_dir() {
        warn!(%split, path = %image_dir.display(), "image directory not found, skipping split");
        return Ok(SplitReport::skipped(
            split,
            SplitIssueCode::MissingImageDir,
            format!("image directory {} not found", image_dir.display()),
        ));
    }

    let pool = match catalog {
        Some(catalog) => select_target_filenames(&catalog, resolver),
        None => TestPool {
            file_names: list_image_dir(&image_dir)?,
            unknown_images: Vec::new(),
        },
    };

    materialize_test_split(config, pool, copier)
}

/// Loads a split's catalog, or `None` when the annotation file is absent.
fn load_catalog(split: Split, path: &Path) -> Result<Option<Catalog>, ExtractError> {
    if !path.is_file() {
        warn!(%split, path = %path.display(), "annotation file not found, skipping split");
        return Ok(None);
    }
    info!(%split, path = %path.display(), "loading annotations");
    Catalog::load(path).map(Some)
}

fn missing_annotations(split: Split, path: &Path) -> SplitReport {
    SplitReport::skipped(
        split,
        SplitIssueCode::MissingAnnotationFile,
        format!("annotation file {} not found", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::FsCopier;

    #[test]
    fn empty_dataset_dir_skips_every_split() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = ExtractConfig::new(temp.path().join("coco"))
            .with_output_dir(temp.path().join("out"));

        let report = run_extraction(&config, &FsCopier).expect("run");

        assert_eq!(report.splits.len(), 3);
        assert!(report.splits.iter().all(SplitReport::is_skipped));
        assert_eq!(
            report.split(Split::Test).unwrap().issues[0].code,
            SplitIssueCode::MissingImageDir
        );
        assert!(report.data_yaml.is_none());
        assert!(temp.path().join("out").is_dir());
    }

    #[test]
    fn invalid_config_is_rejected_before_any_output() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = ExtractConfig::new(temp.path().join("coco"))
            .with_output_dir(temp.path().join("out"))
            .with_background_percentage(-1.0);

        let err = run_extraction(&config, &FsCopier).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig { .. }));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_only_targets_without_annotations_is_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = ExtractConfig::new(temp.path().join("coco"))
            .with_output_dir(temp.path().join("out"))
            .with_target_classes(["cat"])
            .with_test_only_target_classes(true);

        let report = run_extraction(&config, &FsCopier).expect("run");
        let test = report.split(Split::Test).unwrap();
        assert!(test.is_skipped());
        assert_eq!(test.issues[0].code, SplitIssueCode::MissingAnnotationFile);
    }

    #[test]
    fn test_only_targets_without_image_dir_is_skipped() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let annotations = temp.path().join("coco/annotations");
        fs::create_dir_all(&annotations).expect("create annotations dir");
        fs::write(
            annotations.join("instances_test2017.json"),
            r#"{"images":[{"id":1,"file_name":"a.jpg","width":10,"height":10}],
                "categories":[{"id":1,"name":"cat"}],
                "annotations":[{"image_id":1,"category_id":1,"bbox":[0,0,5,5]}]}"#,
        )
        .expect("write annotations");
        let config = ExtractConfig::new(temp.path().join("coco"))
            .with_output_dir(temp.path().join("out"))
            .with_target_classes(["cat"])
            .with_test_only_target_classes(true);

        let report = run_extraction(&config, &FsCopier).expect("run");
        let test = report.split(Split::Test).unwrap();
        assert!(test.is_skipped());
        assert_eq!(test.issues[0].code, SplitIssueCode::MissingImageDir);
        assert_eq!(test.counts.images_copied, 0);
    }
}
