//! Path helpers for locating inputs and naming outputs

use std::path::{Path, PathBuf};

use crate::error::{RemuxError, RemuxResult};

/// Path utilities
pub struct PathUtils;

impl PathUtils {
    /// Whether `path` carries `extension`, ignoring case and a leading dot
    pub fn has_extension(path: &Path, extension: &str) -> bool {
        let wanted = extension.trim_start_matches('.');
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    }

    /// Get file stem (name without extension) from path
    pub fn get_stem(path: &Path) -> Option<String> {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
    }

    /// Output path for `input`: `<stem><suffix>.<extension>`, placed in `output_dir` if
    /// given and next to the input otherwise
    pub fn output_path_for(
        input: &Path,
        suffix: &str,
        extension: &str,
        output_dir: Option<&Path>,
    ) -> RemuxResult<PathBuf> {
        let stem = Self::get_stem(input).ok_or_else(|| {
            RemuxError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("No file name in path {}", input.display()),
            ))
        })?;

        let extension = extension.trim_start_matches('.').to_lowercase();
        let file_name = if extension.is_empty() {
            format!("{}{}", stem, suffix)
        } else {
            format!("{}{}.{}", stem, suffix, extension)
        };

        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Ok(dir.join(file_name))
    }
}
