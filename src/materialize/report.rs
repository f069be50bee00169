//! Per-split results: counts plus the recoverable problems met on the way.

use serde::Serialize;
use std::fmt;

use crate::config::Split;

/// What happened to one split.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    pub split: Split,
    pub status: SplitStatus,
    pub counts: SplitCounts,
    pub issues: Vec<SplitIssue>,
}

impl SplitReport {
    pub fn new(split: Split) -> Self {
        Self {
            split,
            status: SplitStatus::Completed,
            counts: SplitCounts::default(),
            issues: Vec::new(),
        }
    }

    /// A split that produced no output, with the reason.
    pub fn skipped(split: Split, code: SplitIssueCode, message: impl Into<String>) -> Self {
        let mut report = Self::new(split);
        report.status = SplitStatus::Skipped;
        report.add(SplitIssue::warning(code, message));
        report
    }

    pub fn add(&mut self, issue: SplitIssue) {
        self.issues.push(issue);
    }

    pub fn is_skipped(&self) -> bool {
        self.status == SplitStatus::Skipped
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == SplitSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == SplitSeverity::Info)
            .count()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            SplitStatus::Skipped => writeln!(f, "{}: skipped", self.split)?,
            SplitStatus::Completed => writeln!(
                f,
                "{}: {} images ({} target, {} background), {} label files, {} label rows",
                self.split,
                self.counts.images_copied,
                self.counts.target_images,
                self.counts.background_images,
                self.counts.label_files,
                self.counts.label_rows,
            )?,
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f, "  Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == SplitSeverity::Warning)
            {
                writeln!(f, "    - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f, "  Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == SplitSeverity::Info)
            {
                writeln!(f, "    - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStatus {
    Completed,
    Skipped,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    /// Images selected because they hold a target class (or all images
    /// when no classes are targeted). For the test split, images in the pool.
    pub target_images: usize,
    pub background_images: usize,
    pub images_copied: usize,
    pub label_files: usize,
    /// YOLO lines or reduced-COCO records written across all label files.
    pub label_rows: usize,
}

/// A recoverable problem or a policy note.
#[derive(Clone, Debug, Serialize)]
pub struct SplitIssue {
    pub severity: SplitSeverity,
    pub code: SplitIssueCode,
    pub message: String,
}

impl SplitIssue {
    pub fn warning(code: SplitIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: SplitSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: SplitIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: SplitSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSeverity {
    /// Input was skipped.
    Warning,
    /// A policy decision; nothing was lost.
    Info,
}

/// Stable issue codes for `--report json` consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitIssueCode {
    /// The split's annotation file does not exist.
    MissingAnnotationFile,
    /// The split's image directory does not exist.
    MissingImageDir,
    /// A selected image id has no image record.
    MissingImageRecord,
    /// An image has zero width or height; its YOLO label is left empty.
    DegenerateImageSize,
    /// The test cap exceeded the pool and was clamped.
    SampleCapClamped,
    /// The test pool was randomly reduced to the cap.
    SampledTestImages,
    /// Background images were requested without target classes.
    BackgroundIgnoredWithoutTargets,
}
