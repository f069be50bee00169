//! File-copy seam used when materializing image files.

use std::fs;
use std::path::Path;

use crate::error::ExtractError;

/// Copies one image into the output tree.
///
/// `to` is the full destination path; its parent directory already exists.
pub trait FileCopier {
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), ExtractError>;
}

/// Copies with [`std::fs::copy`], overwriting existing destinations.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), ExtractError> {
        fs::copy(from, to).map_err(|source| ExtractError::CopyImage {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
