//! Post-processors that read what a tool left on disk.
//!
//! Each one does a single read of the artifact path the builder chose.
//! Errors degrade the report to a warning; they never fail the execution.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::json;
use toolbench_domain::execution::{ArtifactError, Extras, PostProcessor};
use toolbench_domain::tool::ValidatedParams;

/// Counts the subdomains subfinder wrote, one per non-empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubdomainCount;

impl PostProcessor for SubdomainCount {
    fn process(
        &self,
        artifact: Option<&Path>,
        _params: &ValidatedParams,
    ) -> Result<Extras, ArtifactError> {
        let path = artifact.ok_or(ArtifactError::NoArtifact)?;
        let content = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        let count = content.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(Extras::from([
            ("discovered_count".to_string(), json!(count)),
            ("output_file".to_string(), json!(path.display().to_string())),
        ]))
    }
}

/// Reports the size of a downloaded file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadedFile;

impl PostProcessor for DownloadedFile {
    fn process(
        &self,
        artifact: Option<&Path>,
        _params: &ValidatedParams,
    ) -> Result<Extras, ArtifactError> {
        let path = artifact.ok_or(ArtifactError::NoArtifact)?;
        let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
        Ok(Extras::from([
            ("path".to_string(), json!(path.display().to_string())),
            ("size_bytes".to_string(), json!(metadata.len())),
        ]))
    }
}

/// Reports where msfvenom wrote its payload and how big it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratedPayload;

impl PostProcessor for GeneratedPayload {
    fn process(
        &self,
        artifact: Option<&Path>,
        _params: &ValidatedParams,
    ) -> Result<Extras, ArtifactError> {
        let path = artifact.ok_or(ArtifactError::NoArtifact)?;
        let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
        let size = metadata.len();
        let size_kb = (size as f64 / 1024.0 * 100.0).round() / 100.0;
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(Extras::from([
            ("path".to_string(), json!(path.display().to_string())),
            ("size_bytes".to_string(), json!(size)),
            ("size_kb".to_string(), json!(size_kb)),
        ]))
    }
}

/// Confirms the clone directory exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClonedRepository;

impl PostProcessor for ClonedRepository {
    fn process(
        &self,
        artifact: Option<&Path>,
        _params: &ValidatedParams,
    ) -> Result<Extras, ArtifactError> {
        let path = artifact.ok_or(ArtifactError::NoArtifact)?;
        let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
        if !metadata.is_dir() {
            return Err(ArtifactError::Read {
                path: path.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        Ok(Extras::from([(
            "path".to_string(),
            json!(path.display().to_string()),
        )]))
    }
}

fn read_error(path: &Path, e: io::Error) -> ArtifactError {
    if e.kind() == io::ErrorKind::NotFound {
        ArtifactError::Missing(path.to_path_buf())
    } else {
        ArtifactError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_subdomain_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "a.example.com\nb.example.com\n\n  \nc.example.com").unwrap();
        drop(file);

        let extras = SubdomainCount
            .process(Some(&path), &ValidatedParams::new())
            .unwrap();
        assert_eq!(extras["discovered_count"], 3);
        assert_eq!(extras["output_file"], path.display().to_string());
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.txt");
        let err = SubdomainCount
            .process(Some(&path), &ValidatedParams::new())
            .unwrap_err();
        assert_eq!(err, ArtifactError::Missing(path.clone()));

        let err = DownloadedFile
            .process(None, &ValidatedParams::new())
            .unwrap_err();
        assert_eq!(err, ArtifactError::NoArtifact);
    }

    #[test]
    fn test_downloaded_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        fs::write(&path, vec![0u8; 1234]).unwrap();

        let extras = DownloadedFile
            .process(Some(&path), &ValidatedParams::new())
            .unwrap();
        assert_eq!(extras["size_bytes"], 1234);
    }

    #[test]
    fn test_generated_payload_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.apk");
        fs::write(&path, vec![0u8; 10_342]).unwrap();

        let extras = GeneratedPayload
            .process(Some(&path), &ValidatedParams::new())
            .unwrap();
        assert_eq!(extras["size_bytes"], 10_342);
        assert_eq!(extras["size_kb"], 10.1);
        assert_eq!(
            extras["path"],
            fs::canonicalize(&path).unwrap().display().to_string()
        );

        let missing = dir.path().join("never.apk");
        let err = GeneratedPayload
            .process(Some(&missing), &ValidatedParams::new())
            .unwrap_err();
        assert_eq!(err, ArtifactError::Missing(missing));
    }

    #[test]
    fn test_cloned_repository_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let extras = ClonedRepository
            .process(Some(dir.path()), &ValidatedParams::new())
            .unwrap();
        assert_eq!(extras["path"], dir.path().display().to_string());

        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        let err = ClonedRepository
            .process(Some(&file), &ValidatedParams::new())
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Read { .. }));
    }
}
