use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use camino::Utf8Path;
use serde::Serialize;

use crate::domain::VariableName;
use crate::error::GrabError;

pub const DEFAULT_HTAR_THREADS: u32 = 15;

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub hsi: Option<String>,
    pub htar: Option<String>,
}

/// The tape archive, as seen through its command-line tools.
pub trait ArchiveClient {
    /// Succeeds when `path` exists in the archive.
    fn list(&self, path: &str) -> Result<(), GrabError>;

    /// Unpacks the archive member at `path` into `destination`.
    fn extract(
        &self,
        variable: &VariableName,
        path: &str,
        destination: &Utf8Path,
    ) -> Result<(), GrabError>;

    fn tool_info(&self) -> ToolInfo;
}

/// `hsi`/`htar` as installed on NERSC login and transfer nodes.
#[derive(Debug, Clone)]
pub struct HpssClient {
    hsi: Option<PathBuf>,
    htar: Option<PathBuf>,
    htar_threads: u32,
}

impl HpssClient {
    /// Explicit programs take precedence over a `PATH` lookup. Both are made
    /// absolute, since htar runs from the destination directory.
    pub fn with_programs(hsi: Option<PathBuf>, htar: Option<PathBuf>, htar_threads: u32) -> Self {
        Self {
            hsi: hsi.or_else(|| find_in_path("hsi")).map(absolutize),
            htar: htar.or_else(|| find_in_path("htar")).map(absolutize),
            htar_threads,
        }
    }

    fn require(program: &Option<PathBuf>, name: &str) -> Result<PathBuf, GrabError> {
        program
            .clone()
            .ok_or_else(|| GrabError::MissingTool(name.to_string()))
    }
}

impl ArchiveClient for HpssClient {
    fn list(&self, path: &str) -> Result<(), GrabError> {
        let hsi = Self::require(&self.hsi, "hsi")?;
        let query = format!("ls {path}");
        tracing::debug!(program = %hsi.display(), %query, "querying archive");

        let output = Command::new(&hsi)
            .arg(query.trim_end())
            .stdin(Stdio::null())
            .output()
            .map_err(|err| GrabError::VerificationFailed {
                path: path.to_string(),
                message: format!("could not run {}: {err}", hsi.display()),
            })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("hsi exited with {}", output.status)
        } else {
            stderr
        };
        Err(GrabError::VerificationFailed {
            path: path.to_string(),
            message,
        })
    }

    fn extract(
        &self,
        variable: &VariableName,
        path: &str,
        destination: &Utf8Path,
    ) -> Result<(), GrabError> {
        let htar = Self::require(&self.htar, "htar")?;
        let threads = self.htar_threads.to_string();
        tracing::debug!(
            program = %htar.display(),
            %destination,
            threads = self.htar_threads,
            "running htar"
        );

        // htar writes into its working directory; ours is left alone.
        let status = Command::new(&htar)
            .args(["-T", threads.as_str(), "-xf", path])
            .current_dir(destination.as_std_path())
            .stdin(Stdio::null())
            .status()
            .map_err(|err| GrabError::ExtractionFailed {
                variable: variable.to_string(),
                path: path.to_string(),
                message: format!("could not run {}: {err}", htar.display()),
            })?;
        if status.success() {
            return Ok(());
        }
        Err(GrabError::ExtractionFailed {
            variable: variable.to_string(),
            path: path.to_string(),
            message: format!("htar exited with {status}"),
        })
    }

    fn tool_info(&self) -> ToolInfo {
        ToolInfo {
            hsi: self.hsi.as_ref().map(|path| path.display().to_string()),
            htar: self.htar.as_ref().map(|path| path.display().to_string()),
        }
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_file(candidate))
}

fn absolutize(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_file()).unwrap_or(false)
}
