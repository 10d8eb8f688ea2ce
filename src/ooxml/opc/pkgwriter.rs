//! Package writer for OPC packages.
//!
//! Assembles the parts staged by a [`PathManager`] into a ZIP container.
//! The part emitters are responsible for what the package contains,
//! including `[Content_Types].xml` and the relationship parts; this module
//! only moves bytes.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use zip::write::{SimpleFileOptions, ZipWriter};

use super::path_manager::PathManager;
use crate::common::error::Result;

/// Package writer that serializes staged parts to a ZIP file.
///
/// # Example
///
/// ```no_run
/// use longan::ooxml::opc::{PackageWriter, PathManager};
///
/// let mut parts = PathManager::in_temp_dir()?;
/// let path = parts.register_xml("[Content_Types].xml")?;
/// std::fs::write(path, b"<Types/>")?;
/// PackageWriter::write("output.xlsx", &parts)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PackageWriter;

impl PackageWriter {
    /// Write every registered part to a new ZIP file at `path`.
    ///
    /// The package is assembled in a temporary file next to `path` and
    /// renamed into place, so a failed write leaves no partial file behind
    /// and never clobbers an existing one.
    pub fn write<P: AsRef<Path>>(path: P, parts: &PathManager) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = tempfile::Builder::new()
            .prefix(".longan-")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let mut file = Self::write_to_stream(BufWriter::new(staged), parts)?;
        file.flush()?;
        let staged = file.into_inner().map_err(|err| err.into_error())?;
        staged.persist(path).map_err(|err| err.error)?;

        log::debug!(
            "wrote package {} with {} parts",
            path.display(),
            parts.content_files().len()
        );
        Ok(())
    }

    /// Write every registered part to `writer` and hand the writer back.
    ///
    /// Parts are deflated and stored in registration order. A registered
    /// part whose file does not exist fails the whole write.
    pub fn write_to_stream<W: Write + Seek>(writer: W, parts: &PathManager) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for name in parts.content_files() {
            let path = parts.part_path(name);
            let mut source = File::open(&path).inspect_err(|err| {
                log::debug!("cannot open staged part {}: {}", path.display(), err);
            })?;
            zip.start_file(name.as_str(), options)?;
            io::copy(&mut source, &mut zip)?;
            log::trace!("packed {name}");
        }

        Ok(zip.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use std::io::{Cursor, Read};

    fn staged(parts: &[(&str, &str)]) -> (tempfile::TempDir, PathManager) {
        let dir = tempfile::tempdir().unwrap();
        let mut pm = PathManager::new(dir.path());
        for (name, body) in parts {
            let path = pm.register_xml(name).unwrap();
            std::fs::write(path, body).unwrap();
        }
        (dir, pm)
    }

    #[test]
    fn test_parts_in_registration_order() {
        let (_dir, pm) = staged(&[
            ("[Content_Types].xml", "<Types/>"),
            ("_rels/.rels", "<Relationships/>"),
            ("/xl/workbook.xml", "<workbook/>"),
        ]);
        let cursor = PackageWriter::write_to_stream(Cursor::new(Vec::new()), &pm).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["[Content_Types].xml", "_rels/.rels", "xl/workbook.xml"]);

        let mut body = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<workbook/>");
        assert_eq!(
            archive.by_name("_rels/.rels").unwrap().compression(),
            zip::CompressionMethod::Deflated
        );
    }

    #[test]
    fn test_missing_part_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut pm = PathManager::new(dir.path());
        pm.register_xml("xl/workbook.xml").unwrap();
        let result = PackageWriter::write_to_stream(Cursor::new(Vec::new()), &pm);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut pm = PathManager::new(dir.path());
        let path = pm.register_xml("docProps/app.xml").unwrap();
        std::fs::write(path, "<Properties/>").unwrap();
        pm.register_xml("xl/workbook.xml").unwrap();

        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("book.xlsx");
        assert!(matches!(PackageWriter::write(&target, &pm), Err(Error::Io(_))));
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_existing_package() {
        let dir = tempfile::tempdir().unwrap();
        let mut pm = PathManager::new(dir.path());
        pm.register_xml("xl/workbook.xml").unwrap();

        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("book.xlsx");
        std::fs::write(&target, b"previous").unwrap();
        assert!(PackageWriter::write(&target, &pm).is_err());
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
    }

    #[test]
    fn test_write_to_file() {
        let (_dir, pm) = staged(&[("docProps/app.xml", "<Properties/>")]);
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("book.xlsx");
        PackageWriter::write(&target, &pm).unwrap();

        let archive = zip::ZipArchive::new(File::open(&target).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }
}
