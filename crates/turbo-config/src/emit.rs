use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::TurboConfig;

/// Where the document is written, relative to the working directory.
pub const DEFAULT_PATH: &str = "turbo.json";

/// The destination could not be created, written, or replaced.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to write {}", .path.display())]
#[diagnostic(
    code(turbo_config::write_failure),
    help("check that the destination directory exists and is writable")
)]
pub struct WriteFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl WriteFailure {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write the default document to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`WriteFailure`] if the file cannot be written. An existing file
/// at `path` is left as it was.
pub fn emit(path: &Path) -> Result<(), WriteFailure> {
    TurboConfig::default_document().write_to(path)
}

impl TurboConfig {
    /// Write the rendered document to `path`.
    ///
    /// The content goes to a temporary file next to the destination which is
    /// then renamed over it, so readers only ever see the old or the new
    /// document. A symlink at `path` is written through: its target is
    /// replaced and the link stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`WriteFailure`] if an existing file at the destination is not
    /// writable, or if the temporary file cannot be created, written, or
    /// renamed onto the destination. The temporary file is removed on failure.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn write_to(&self, path: &Path) -> Result<(), WriteFailure> {
        let fail = |e| WriteFailure::new(path, e);

        let dest = resolve_destination(path).map_err(fail)?;
        if dest.as_path() != path {
            tracing::debug!(resolved = %dest.display(), "writing through symlink");
        }
        let permissions = existing_permissions(&dest)
            .map_err(fail)?
            .or_else(default_permissions);
        let contents = self.render();

        let mut file = NamedTempFile::new_in(parent_dir(&dest)).map_err(fail)?;
        tracing::debug!(temp = %file.path().display(), "created temporary file");

        if let Some(permissions) = permissions {
            file.as_file().set_permissions(permissions).map_err(fail)?;
        }
        file.write_all(contents.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(fail)?;

        file.persist(&dest).map_err(|e| fail(e.error))?;
        tracing::info!(bytes = contents.len(), "wrote config");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// The file the rename must land on. A symlink resolves to its target, which
/// may not exist yet for a dangling link.
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(target),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(parent_dir(path).join(fs::read_link(path)?))
            }
            Err(e) => Err(e),
        },
        _ => Ok(path.to_path_buf()),
    }
}

/// Permissions of the file being replaced, after checking that it may be
/// written. A rename only needs access to the directory, so a write-protected
/// file has to be refused here.
fn existing_permissions(dest: &Path) -> io::Result<Option<fs::Permissions>> {
    let meta = match fs::metadata(dest) {
        Ok(meta) if meta.is_file() => meta,
        _ => return Ok(None),
    };
    if meta.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "file is read-only",
        ));
    }
    fs::OpenOptions::new().append(true).open(dest)?;
    Ok(Some(meta.permissions()))
}

/// Temporary files are created `0600`; a new file gets the usual `0644`.
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
