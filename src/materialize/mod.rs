//! Writing one split of the output dataset.
//!
//! For every selected image the materializer copies the source file into
//! `<output>/<split>/images/`, writes its label file (train/valid only) and
//! records the output-relative image path in `<output>/<split>.txt`.

mod copier;
pub mod report;

pub use copier::{FileCopier, FsCopier};
pub use report::{SplitCounts, SplitIssue, SplitIssueCode, SplitReport, SplitSeverity, SplitStatus};

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, ClassResolver};
use crate::config::{image_base_name, label_file_name, manifest_entry, ExtractConfig, LabelFormat, Split};
use crate::error::ExtractError;
use crate::ir::ImageId;
use crate::select::{capped_count, sample_without_replacement, select_images, TestPool};
use crate::transcode::transcode;

/// Materializes a train or valid split from its catalog.
pub fn materialize_labelled_split(
    config: &ExtractConfig,
    split: Split,
    catalog: &Catalog,
    resolver: &ClassResolver,
    copier: &dyn FileCopier,
) -> Result<SplitReport, ExtractError> {
    let mut report = SplitReport::new(split);

    if !resolver.is_filtering() && config.background_percentage > 0.0 {
        report.add(SplitIssue::info(
            SplitIssueCode::BackgroundIgnoredWithoutTargets,
            format!(
                "background_percentage {} ignored: every image is already selected when no target classes are given",
                config.background_percentage
            ),
        ));
    }

    let selection = select_images(catalog, resolver, config.background_percentage);
    report.counts.target_images = selection.target.len();
    report.counts.background_images = selection.background.len();

    let images_dir = create_dir(&config.split_output_dir(split).join("images"))?;
    let labels_dir = create_dir(
        &config
            .split_output_dir(split)
            .join(config.label_format.dir_name()),
    )?;
    let source_dir = config.image_dir(split);

    info!(
        %split,
        target_images = selection.target.len(),
        background_images = selection.background.len(),
        "materializing split"
    );

    let progress = progress_bar(selection.len() as u64, split.name(), config.show_progress);
    let mut manifest = Vec::with_capacity(selection.len());

    for (image_id, is_background) in selection.iter() {
        progress.inc(1);

        let Some(image) = catalog.image(image_id) else {
            warn!(%split, image = %image_id, "no image record for selected image");
            report.add(SplitIssue::warning(
                SplitIssueCode::MissingImageRecord,
                format!("image id {image_id} is referenced by annotations but has no image record"),
            ));
            continue;
        };

        copy_image(copier, &source_dir, &images_dir, &image.file_name)?;
        report.counts.images_copied += 1;
        manifest.push(manifest_entry(split, &image.file_name));

        if config.label_format == LabelFormat::Yolo
            && !is_background
            && !image.has_area()
            && has_output_labels(catalog, resolver, image.id)
        {
            report.add(SplitIssue::warning(
                SplitIssueCode::DegenerateImageSize,
                format!(
                    "{} has size {}x{}; its labels were left empty",
                    image.file_name, image.width, image.height
                ),
            ));
        }

        let payload = transcode(catalog, resolver, image, config.label_format, is_background);
        let label_path = labels_dir.join(label_file_name(&image.file_name, config.label_format));
        let body = payload
            .render()
            .map_err(|source| ExtractError::LabelJsonWrite {
                path: label_path.clone(),
                source,
            })?;
        fs::write(&label_path, body)?;

        report.counts.label_files += 1;
        report.counts.label_rows += payload.len();
    }

    progress.finish_and_clear();
    write_manifest(&config.manifest_path(split), &manifest)?;

    info!(%split, images = report.counts.images_copied, "split done");
    Ok(report)
}

/// Materializes the test split from a pool of file names.
///
/// The pool is capped by `test_num_images`; no label files are written.
pub fn materialize_test_split(
    config: &ExtractConfig,
    pool: TestPool,
    copier: &dyn FileCopier,
) -> Result<SplitReport, ExtractError> {
    let split = Split::Test;
    let mut report = SplitReport::new(split);

    for image_id in &pool.unknown_images {
        warn!(%split, image = %image_id, "no image record for matching annotation");
        report.add(SplitIssue::warning(
            SplitIssueCode::MissingImageRecord,
            format!("image id {image_id} is referenced by annotations but has no image record"),
        ));
    }

    let total = pool.file_names.len();
    let keep = capped_count(total, config.test_num_images);
    if let Some(cap) = config.test_num_images {
        if cap > total {
            warn!(cap, available = total, "test_num_images exceeds the available images");
            report.add(SplitIssue::info(
                SplitIssueCode::SampleCapClamped,
                format!("test_num_images {cap} clamped to the {total} available images"),
            ));
        } else if cap < total {
            report.add(SplitIssue::info(
                SplitIssueCode::SampledTestImages,
                format!("sampled {cap} of {total} test images"),
            ));
        }
    }

    let file_names = sample_without_replacement(pool.file_names, keep, config.seed);
    report.counts.target_images = file_names.len();

    let images_dir = create_dir(&config.split_output_dir(split).join("images"))?;
    let source_dir = config.image_dir(split);

    info!(%split, images = file_names.len(), "materializing split");

    let progress = progress_bar(file_names.len() as u64, split.name(), config.show_progress);
    let mut manifest = Vec::with_capacity(file_names.len());

    for file_name in &file_names {
        progress.inc(1);
        copy_image(copier, &source_dir, &images_dir, file_name)?;
        report.counts.images_copied += 1;
        manifest.push(manifest_entry(split, file_name));
    }

    progress.finish_and_clear();
    write_manifest(&config.manifest_path(split), &manifest)?;

    info!(%split, images = report.counts.images_copied, "split done");
    Ok(report)
}

/// True when at least one annotation of the image maps to an output class.
fn has_output_labels(catalog: &Catalog, resolver: &ClassResolver, image_id: ImageId) -> bool {
    catalog
        .annotations_for(image_id)
        .iter()
        .any(|ann| resolver.output_index(catalog, ann.category_id).is_some())
}

fn copy_image(
    copier: &dyn FileCopier,
    source_dir: &Path,
    images_dir: &Path,
    file_name: &str,
) -> Result<(), ExtractError> {
    let from = source_dir.join(file_name);
    let to = images_dir.join(image_base_name(file_name));
    debug!(from = %from.display(), to = %to.display(), "copying image");
    copier.copy_file(&from, &to)
}

fn create_dir(path: &Path) -> Result<PathBuf, ExtractError> {
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Writes newline-joined entries with no trailing newline.
fn write_manifest(path: &Path, entries: &[String]) -> Result<(), ExtractError> {
    fs::write(path, entries.join("\n"))?;
    Ok(())
}

fn progress_bar(len: u64, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{label}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})"
        ))
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
