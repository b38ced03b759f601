//! Directory-tree bundle source

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use super::stream::stream_records;
use super::{RecordSource, SourceSummary};
use crate::config::{is_bundle_name, RECORDS_KEY};
use crate::errors::SourceError;

/// Streams records from every `.json` bundle under a directory.
///
/// Entries are visited depth-first in file-name order so repeated runs over
/// the same tree assign the same node indices.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bundle files under the root, in visit order.
    ///
    /// Unreadable directory entries are logged and skipped.
    pub fn bundle_paths(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::invalid_data_dir(&self.root));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %SourceError::from(e), "Skipping unreadable directory entry");
                    continue;
                }
            };
            // Links to files are read through; links to directories are not walked
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }
            let is_bundle = entry
                .file_name()
                .to_str()
                .map(is_bundle_name)
                .unwrap_or(false);
            if is_bundle {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

/// Stream one bundle; the file handle is released when this returns.
fn read_bundle<F>(path: &Path, visit: &mut F) -> Result<usize, SourceError>
where
    F: FnMut(Value),
{
    let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
    let count = stream_records(BufReader::new(file), &mut *visit)
        .map_err(|e| SourceError::from_json(path, e))?;

    match count {
        Some(count) => Ok(count),
        None => {
            warn!(path = %path.display(), "Bundle has no {} key", RECORDS_KEY);
            Ok(0)
        }
    }
}

impl RecordSource for DirectorySource {
    fn drain<F>(&mut self, mut visit: F) -> Result<SourceSummary, SourceError>
    where
        F: FnMut(Value),
    {
        let mut summary = SourceSummary::default();

        for path in self.bundle_paths()? {
            summary.files_scanned += 1;

            // Count deliveries directly so a failed file still reports the
            // records it produced before the failure
            let mut delivered = 0;
            let result = read_bundle(&path, &mut |record| {
                delivered += 1;
                visit(record);
            });
            summary.records += delivered;

            match result {
                Ok(count) => {
                    debug!(path = %path.display(), records = count, "Read bundle");
                }
                Err(e) => {
                    summary.files_failed += 1;
                    error!(
                        path = %path.display(),
                        records_before_failure = delivered,
                        error = %e,
                        "Failed to read bundle"
                    );
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = DirectorySource::new(dir.path().join("absent"));

        let result = source.drain(|_| {});
        assert!(matches!(result, Err(SourceError::InvalidDataDir { .. })));
    }

    #[test]
    fn test_bundle_paths_are_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        fs::write(dir.path().join("z.json"), "{}").unwrap();
        fs::write(dir.path().join("a.JSON"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("b/nested/c.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("dir.json")).unwrap();

        let source = DirectorySource::new(dir.path());
        let names: Vec<PathBuf> = source
            .bundle_paths()
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.JSON"),
                PathBuf::from("b/nested/c.json"),
                PathBuf::from("z.json"),
            ]
        );
    }

    #[test]
    fn test_failed_bundle_does_not_stop_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("1.json"),
            r#"{"Records": [{"eventName": "A"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("2.json"),
            r#"{"Records": [{"eventName": "B"}, {"eventN"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("3.json"),
            r#"{"Records": [{"eventName": "C"}]}"#,
        )
        .unwrap();

        let mut seen = Vec::new();
        let summary = DirectorySource::new(dir.path())
            .drain(|record| seen.push(record["eventName"].as_str().unwrap().to_string()))
            .unwrap();

        assert_eq!(seen, vec!["A", "B", "C"]);
        assert_eq!(
            summary,
            SourceSummary {
                files_scanned: 3,
                files_failed: 1,
                records: 3,
            }
        );
    }

    #[test]
    fn test_bundle_without_records_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("digest.json"), r#"{"digestStartTime": "x"}"#).unwrap();

        let summary = DirectorySource::new(dir.path()).drain(|_| {}).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_failed, 0);
        assert_eq!(summary.records, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_bundle_is_read() {
        let target_dir = tempfile::tempdir().unwrap();
        let target = target_dir.path().join("real.json");
        fs::write(&target, r#"{"Records": [{"eventName": "GetObject"}]}"#).unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.json")).unwrap();
        std::os::unix::fs::symlink(
            target_dir.path().join("gone.json"),
            dir.path().join("dangling.json"),
        )
        .unwrap();

        let mut seen = Vec::new();
        let summary = DirectorySource::new(dir.path())
            .drain(|record| seen.push(record["eventName"].clone()))
            .unwrap();

        assert_eq!(seen, vec![Value::from("GetObject")]);
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.records, 1);
    }
}
