use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::storage::RESERVED_DIRECTORIES;
use crate::worker::job::FileRecord;

/// Substring a file name must contain to be picked up.
const PDF_MARKER: &str = "pdf";

/// Finds uploadable files in `<working_directory>/<unit>/`.
pub struct DirectoryScanner {
    working_directory: PathBuf,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(working_directory: P) -> Self {
        Self {
            working_directory: working_directory.as_ref().to_path_buf(),
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Lists unit directories in name order, skipping Failed/Finished/Logs.
    pub fn unit_directories(&self) -> Result<Vec<PathBuf>, WorkerError> {
        let mut units = Vec::new();

        for entry in WalkDir::new(&self.working_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| WorkerError::ScanFailed {
                path: self.working_directory.clone(),
                source: e,
            })?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if RESERVED_DIRECTORIES.contains(&name.as_ref()) {
                continue;
            }

            units.push(path.to_path_buf());
        }

        Ok(units)
    }

    /// Collects every file whose name contains "pdf" from every unit
    /// directory. Only the top level of each unit is scanned.
    pub fn scan(&self) -> Result<Vec<FileRecord>, WorkerError> {
        let mut records = Vec::new();

        for unit_dir in self.unit_directories()? {
            let unit = unit_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for entry in WalkDir::new(&unit_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry in {}: {}", unit_dir.display(), e);
                        continue;
                    }
                };
                let path = entry.path();

                if !path.is_file() {
                    continue;
                }

                if entry.file_name().to_string_lossy().contains(PDF_MARKER) {
                    debug!("Found document: {}", path.display());
                    records.push(FileRecord::new(path.to_path_buf(), unit.clone()));
                }
            }
        }

        info!(
            "Scanned {} documents in {}",
            records.len(),
            self.working_directory.display()
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(temp_dir.path());

        let records = scanner.scan().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_scan_assigns_unit_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("Bergenhus/ab12c_scan.pdf"));
        touch(&temp_dir.path().join("Arna/zz99z_scan.pdf"));

        let scanner = DirectoryScanner::new(temp_dir.path());
        let records = scanner.scan().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].unit, "Arna");
        assert_eq!(records[0].file_name, "zz99z_scan.pdf");
        assert_eq!(records[1].unit, "Bergenhus");
    }

    #[test]
    fn test_scan_skips_reserved_directories() {
        let temp_dir = TempDir::new().unwrap();
        for reserved in RESERVED_DIRECTORIES {
            touch(&temp_dir.path().join(reserved).join("old.pdf"));
        }
        touch(&temp_dir.path().join("Unit/new.pdf"));

        let scanner = DirectoryScanner::new(temp_dir.path());
        let records = scanner.scan().unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].path.ends_with("Unit/new.pdf"));
    }

    #[test]
    fn test_scan_matches_pdf_substring_only() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("Unit/a.pdf"));
        touch(&temp_dir.path().join("Unit/b.pdf.tmp"));
        touch(&temp_dir.path().join("Unit/notes.txt"));
        touch(&temp_dir.path().join("Unit/c.PDF"));

        let scanner = DirectoryScanner::new(temp_dir.path());
        let names: Vec<String> = scanner
            .scan()
            .unwrap()
            .into_iter()
            .map(|r| r.file_name)
            .collect();

        assert_eq!(names, vec!["a.pdf", "b.pdf.tmp"]);
    }

    #[test]
    fn test_scan_ignores_nested_directories_and_top_level_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("loose.pdf"));
        touch(&temp_dir.path().join("Unit/nested/deep.pdf"));
        std::fs::create_dir_all(temp_dir.path().join("Unit/folder.pdf")).unwrap();
        touch(&temp_dir.path().join("Unit/top.pdf"));

        let scanner = DirectoryScanner::new(temp_dir.path());
        let records = scanner.scan().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "top.pdf");
    }

    #[test]
    fn test_scan_files_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c.pdf", "a.pdf", "b.pdf"] {
            touch(&temp_dir.path().join("Unit").join(name));
        }

        let scanner = DirectoryScanner::new(temp_dir.path());
        let names: Vec<String> = scanner
            .scan()
            .unwrap()
            .into_iter()
            .map(|r| r.file_name)
            .collect();

        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_scan_missing_working_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(temp_dir.path().join("missing"));

        let result = scanner.scan();
        assert!(matches!(result, Err(WorkerError::ScanFailed { .. })));
    }
}
