//! Staging area for package parts.
//!
//! Parts are written to plain files under a root directory before the
//! package is assembled. [`PathManager`] maps part names such as
//! `xl/worksheets/sheet1.xml` to those files, creates the directories they
//! need, and remembers everything it created so the staging area can be
//! removed again.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::error::{Error, Result};

/// Registry of staged part files.
///
/// Registration order is the order in which parts are later added to the
/// package. Dropping the manager removes every registered file and every
/// directory it created; directories that already existed are left alone.
#[derive(Debug)]
pub struct PathManager {
    root: PathBuf,
    content_files: Vec<String>,
    created_dirs: Vec<PathBuf>,
    // Removed after `clear_temp` ran in `drop`.
    temp: Option<TempDir>,
}

impl PathManager {
    /// Stage parts below `root`, which must already exist.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            content_files: Vec::new(),
            created_dirs: Vec::new(),
            temp: None,
        }
    }

    /// Stage parts in a fresh temporary directory owned by the manager.
    pub fn in_temp_dir() -> Result<Self> {
        let temp = tempfile::Builder::new().prefix("longan-").tempdir()?;
        log::debug!("staging package parts in {}", temp.path().display());
        Ok(Self {
            root: temp.path().to_path_buf(),
            content_files: Vec::new(),
            created_dirs: Vec::new(),
            temp: Some(temp),
        })
    }

    /// The staging root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register an XML part and return the file it must be written to.
    ///
    /// `part` is a package member name; a leading `/` is optional and `\`
    /// is accepted as a separator. Missing parent directories are created.
    /// Registering the same part twice returns the same path and keeps the
    /// first position.
    pub fn register_xml(&mut self, part: &str) -> Result<PathBuf> {
        let name = normalize_part_name(part)?;
        self.make_parent_dirs(&name)?;
        let path = self.part_path(&name);
        if !self.content_files.iter().any(|f| *f == name) {
            log::trace!("registered part {name}");
            self.content_files.push(name);
        }
        Ok(path)
    }

    /// Copy the local file at `local` into the package as `part`.
    ///
    /// Returns `Ok(false)` if the source cannot be opened; nothing is
    /// registered in that case.
    pub fn register_image<P: AsRef<Path>>(&mut self, local: P, part: &str) -> Result<bool> {
        let local = local.as_ref();
        let mut source = match File::open(local) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("cannot read image {}: {}", local.display(), err);
                return Ok(false);
            },
        };
        let path = self.register_xml(part)?;
        let mut destination = File::create(&path)?;
        io::copy(&mut source, &mut destination)?;
        Ok(true)
    }

    /// Registered member names, in registration order.
    pub fn content_files(&self) -> &[String] {
        &self.content_files
    }

    /// The staged file backing member `name`.
    pub fn part_path(&self, name: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(name.split('/'));
        path
    }

    /// Remove every registered file, then every created directory, newest
    /// first. Failures are logged and skipped.
    pub fn clear_temp(&mut self) {
        for name in std::mem::take(&mut self.content_files) {
            let path = self.part_path(&name);
            if let Err(err) = fs::remove_file(&path) {
                if err.kind() != ErrorKind::NotFound {
                    log::debug!("cannot remove {}: {}", path.display(), err);
                }
            }
        }
        while let Some(dir) = self.created_dirs.pop() {
            if let Err(err) = fs::remove_dir(&dir) {
                log::debug!("cannot remove directory {}: {}", dir.display(), err);
            }
        }
    }

    fn make_parent_dirs(&mut self, name: &str) -> Result<()> {
        let Some((parents, _)) = name.rsplit_once('/') else {
            return Ok(());
        };
        let mut dir = self.root.clone();
        for component in parents.split('/') {
            dir.push(component);
            match fs::create_dir(&dir) {
                Ok(()) => self.created_dirs.push(dir.clone()),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {},
                Err(err) => return Err(Error::Io(err)),
            }
        }
        Ok(())
    }
}

impl Drop for PathManager {
    fn drop(&mut self) {
        self.clear_temp();
    }
}

/// Canonical member name: `/`-separated, no leading slash, no empty,
/// `.` or `..` segments.
fn normalize_part_name(part: &str) -> Result<String> {
    let unified = part.replace('\\', "/");
    let trimmed = unified.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidPartName(part.to_string()));
    }
    let valid = trimmed
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if !valid {
        return Err(Error::InvalidPartName(part.to_string()));
    }
    Ok(trimmed.to_string())
}
