use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::Label;
use crate::error::GrabError;

/// Local directory that receives the contents of `archive_path`.
///
/// The override wins when given. Otherwise the archive layout is mirrored
/// relative to the current directory, starting at the institution directory.
pub fn target_directory(
    archive_path: &str,
    institution: &Label,
    output_directory: Option<&Utf8Path>,
) -> Result<Utf8PathBuf, GrabError> {
    match output_directory {
        Some(dir) => Ok(dir.to_path_buf()),
        None => mirrored_directory(archive_path, institution),
    }
}

/// Directory components of `archive_path` from the first one equal to the
/// institution onwards. The file name itself never matches.
pub fn mirrored_directory(
    archive_path: &str,
    institution: &Label,
) -> Result<Utf8PathBuf, GrabError> {
    let parent = Utf8Path::new(archive_path)
        .parent()
        .unwrap_or(Utf8Path::new(""));
    let components = parent.components().collect::<Vec<_>>();
    let start = components
        .iter()
        .position(|component| component.as_str() == institution.as_str())
        .ok_or_else(|| GrabError::InstitutionNotInPath {
            institution: institution.to_string(),
            path: archive_path.to_string(),
        })?;

    let mut out = Utf8PathBuf::new();
    for component in &components[start..] {
        out.push(component.as_str());
    }
    Ok(out)
}

pub fn ensure_directory(dir: &Utf8Path) -> Result<(), GrabError> {
    fs::create_dir_all(dir.as_std_path())
        .map_err(|err| GrabError::Filesystem(format!("create {dir}: {err}")))
}

/// True when `dir` exists and holds at least one entry.
pub fn is_populated(dir: &Utf8Path) -> Result<bool, GrabError> {
    if !dir.as_std_path().is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir.as_std_path())
        .map_err(|err| GrabError::Filesystem(format!("read {dir}: {err}")))?;
    Ok(entries.next().is_some())
}
