//! Ultralytics-style YOLO label lines and `data.yaml`.
//!
//! A label line is `<class_index> <xc> <yc> <w> <h>` with all four box
//! values normalized by the image size. Values are written in their shortest
//! form that parses back to the same `f64`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use super::{BBoxXYWH, Normalized};
use crate::error::ExtractError;

pub const DATA_YAML: &str = "data.yaml";

/// One YOLO detection row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YoloLine {
    pub class_index: usize,
    pub bbox: BBoxXYWH<Normalized>,
}

impl YoloLine {
    pub fn new(class_index: usize, bbox: BBoxXYWH<Normalized>) -> Self {
        Self { class_index, bbox }
    }
}

impl fmt::Display for YoloLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cx, cy, w, h) = self.bbox.to_cxcywh();
        write!(
            f,
            "{} {} {} {} {}",
            self.class_index, cx, cy, w, h
        )
    }
}

/// Renders label lines, each terminated by `\n`. No lines yields "".
pub fn render_label_lines(lines: &[YoloLine]) -> String {
    let mut out = String::with_capacity(lines.len() * 48);
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

/// Parses a whole label file body. Blank lines are skipped.
pub fn parse_label_lines(content: &str, file_path: &Path) -> Result<Vec<YoloLine>, ExtractError> {
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, file_path, line_idx + 1)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<YoloLine>, ExtractError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        return Err(ExtractError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 tokens, found {}", tokens.len()),
        });
    }

    let class_index = tokens[0]
        .parse::<usize>()
        .map_err(|_| ExtractError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class index '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(YoloLine::new(
        class_index,
        BBoxXYWH::from_cxcywh(cx, cy, w, h),
    )))
}

/// Fuzz-only entrypoint for YOLO single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), ExtractError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, ExtractError> {
    raw.parse::<f64>()
        .map_err(|_| ExtractError::YoloLabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
        })
}

/// Contents of the Ultralytics dataset descriptor.
#[derive(Debug, Serialize)]
pub struct DataYaml {
    pub path: String,
    pub train: String,
    pub val: String,
    pub test: String,
    pub names: BTreeMap<usize, String>,
}

impl DataYaml {
    /// Builds a descriptor whose class indices follow `class_names` order.
    pub fn new(path: impl Into<String>, class_names: &[String]) -> Self {
        Self {
            path: path.into(),
            train: "train/images".to_string(),
            val: "valid/images".to_string(),
            test: "test/images".to_string(),
            names: class_names.iter().cloned().enumerate().collect(),
        }
    }
}

/// Writes `data.yaml` into `output_root` and returns its path.
pub fn write_data_yaml(
    output_root: &Path,
    data: &DataYaml,
) -> Result<std::path::PathBuf, ExtractError> {
    let path = output_root.join(DATA_YAML);
    let yaml = serde_yaml::to_string(data).map_err(|source| ExtractError::DataYamlWrite {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, yaml).map_err(ExtractError::Io)?;
    Ok(path)
}
