//! Resource provisioning: fonts and images copied into the output tree

use crate::config::Settings;
use crate::error::ResourceError;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves font and image sources to paths usable from the output directory
///
/// Both operations are synchronous and are called from builder methods, so
/// a missing resource fails at the call site that requested it.
pub trait ResourceProvisioner: std::fmt::Debug {
    /// Resolve a font path or URL; returns the path relative to the output directory
    fn resolve_font(&self, source: &str, display_name: &str) -> Result<PathBuf, ResourceError>;

    /// Resolve an image path; returns the path relative to the output directory
    fn resolve_image(&self, path: &Path) -> Result<PathBuf, ResourceError>;
}

/// Sub-directory of the output directory holding copied images
const IMAGES_DIR: &str = "images";

/// Local-filesystem provisioner
///
/// Copies resources into `<output_dir>/images` and `<output_dir>/<fonts_dir>`.
/// Remote font sources are not fetched and resolve as not found.
#[derive(Debug, Clone)]
pub struct FsProvisioner {
    output_dir: PathBuf,
    fonts_dir: PathBuf,
}

impl FsProvisioner {
    pub fn new(output_dir: impl Into<PathBuf>, fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fonts_dir: fonts_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.directories.output_dir.clone(),
            settings.directories.fonts_dir.clone(),
        )
    }

    /// Copy `source` into `<output_dir>/<subdir>/` and return `<subdir>/<file name>`
    fn copy_into(&self, source: &Path, subdir: &Path) -> Result<PathBuf, ResourceError> {
        let file_name = source.file_name().ok_or_else(|| ResourceError::NotFound {
            kind: "file",
            path: source.display().to_string(),
        })?;
        let target_dir = self.output_dir.join(subdir);
        fs::create_dir_all(&target_dir).map_err(|source_err| ResourceError::Io {
            path: target_dir.clone(),
            source: source_err,
        })?;

        let target = target_dir.join(file_name);
        fs::copy(source, &target).map_err(|source_err| ResourceError::Io {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        log::debug!("Provisioned {} -> {}", source.display(), target.display());

        Ok(subdir.join(file_name))
    }
}

/// Whether a font source names a remote location rather than a local file
fn is_remote(source: &str) -> bool {
    url::Url::parse(source)
        .map(|u| matches!(u.scheme(), "http" | "https" | "ftp"))
        .unwrap_or(false)
}

impl ResourceProvisioner for FsProvisioner {
    fn resolve_font(&self, source: &str, display_name: &str) -> Result<PathBuf, ResourceError> {
        if is_remote(source) {
            log::warn!(
                "Font '{}' requested from {}; remote sources are not fetched",
                display_name,
                source
            );
            return Err(ResourceError::NotFound {
                kind: "font",
                path: source.to_string(),
            });
        }

        let path = Path::new(source);
        if !path.is_file() {
            return Err(ResourceError::NotFound {
                kind: "font",
                path: source.to_string(),
            });
        }
        self.copy_into(path, &self.fonts_dir)
    }

    fn resolve_image(&self, path: &Path) -> Result<PathBuf, ResourceError> {
        if !path.is_file() {
            return Err(ResourceError::NotFound {
                kind: "image",
                path: path.display().to_string(),
            });
        }
        self.copy_into(path, Path::new(IMAGES_DIR))
    }
}
