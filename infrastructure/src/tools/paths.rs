//! Filesystem locations the built-in tools derive from their parameters.
//!
//! Builders only do path arithmetic with these; the artifact directory is
//! created once, by [`ToolPaths::ensure_artifact_dir`], before any tool runs.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Default directory for files tools are told to produce.
pub const DEFAULT_ARTIFACT_DIR: &str = "/tmp/toolbench_artifacts";

/// Wordlist aliases shipped by Kali's `wordlists`/`dirbuster`/`dnsmap` packages.
pub const DEFAULT_WORDLISTS: [(&str, &str); 5] = [
    ("common", "/usr/share/wordlists/dirb/common.txt"),
    (
        "medium",
        "/usr/share/wordlists/dirbuster/directory-list-2.3-medium.txt",
    ),
    (
        "big",
        "/usr/share/wordlists/dirbuster/directory-list-2.3-big.txt",
    ),
    ("dns", "/usr/share/wordlists/dnsmap.txt"),
    ("rockyou", "/usr/share/wordlists/rockyou.txt"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub artifact_dir: PathBuf,
    pub wordlists: BTreeMap<String, PathBuf>,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            wordlists: DEFAULT_WORDLISTS
                .iter()
                .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
                .collect(),
        }
    }
}

impl ToolPaths {
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    /// Add or replace a wordlist alias.
    pub fn with_wordlist(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.wordlists.insert(alias.into(), path.into());
        self
    }

    /// Create the artifact directory (and its parents) if it is missing.
    pub fn ensure_artifact_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.artifact_dir)
    }

    /// Resolve an alias; anything that isn't one is taken as a literal path.
    pub fn resolve_wordlist(&self, name: &str) -> PathBuf {
        self.wordlists
            .get(name)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(name))
    }

    /// `<artifact_dir>/<last URL segment>`, or `downloaded_file` when the URL
    /// ends in a slash or has no path.
    pub fn download_target(&self, url: &str) -> PathBuf {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let after_scheme = without_query
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(without_query);
        let name = after_scheme
            .split_once('/')
            .and_then(|(_, path)| path.rsplit('/').next())
            .filter(|segment| is_safe_file_name(segment))
            .unwrap_or("downloaded_file");
        self.artifact_dir.join(name)
    }

    /// `<artifact_dir>/<repository name without .git>`.
    pub fn clone_target(&self, repo: &str) -> PathBuf {
        let last = repo
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .unwrap_or_default();
        let name = last.strip_suffix(".git").unwrap_or(last);
        let name = if is_safe_file_name(name) {
            name
        } else {
            "repository"
        };
        self.artifact_dir.join(name)
    }

    /// `<artifact_dir>/payload.<ext>`: `apk` for raw payloads (the Android
    /// default), otherwise the output format's own name.
    pub fn payload_target(&self, format: &str) -> PathBuf {
        let ext = match format {
            "raw" | "" => "apk",
            other if is_safe_file_name(other) && !other.contains('/') => other,
            _ => "bin",
        };
        self.artifact_dir.join(format!("payload.{}", ext))
    }

    /// `<artifact_dir>/subfinder_<domain>.txt`.
    pub fn subdomain_list(&self, domain: &str) -> PathBuf {
        let sanitized: String = domain
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.artifact_dir
            .join(format!("subfinder_{}.txt", sanitized.trim_matches('.')))
    }
}

fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordlist_alias_and_literal() {
        let paths = ToolPaths::default();
        assert_eq!(
            paths.resolve_wordlist("common"),
            PathBuf::from("/usr/share/wordlists/dirb/common.txt")
        );
        assert_eq!(
            paths.resolve_wordlist("/opt/lists/mine.txt"),
            PathBuf::from("/opt/lists/mine.txt")
        );

        let paths = paths.with_wordlist("common", "/srv/common.txt");
        assert_eq!(
            paths.resolve_wordlist("common"),
            PathBuf::from("/srv/common.txt")
        );
    }

    #[test]
    fn test_download_target() {
        let paths = ToolPaths::default().with_artifact_dir("/data");
        assert_eq!(
            paths.download_target("https://example.com/files/tool.tar.gz?x=1"),
            PathBuf::from("/data/tool.tar.gz")
        );
        assert_eq!(
            paths.download_target("https://example.com/"),
            PathBuf::from("/data/downloaded_file")
        );
        assert_eq!(
            paths.download_target("https://example.com"),
            PathBuf::from("/data/downloaded_file")
        );
        assert_eq!(
            paths.download_target("https://example.com/a/.."),
            PathBuf::from("/data/downloaded_file")
        );
    }

    #[test]
    fn test_clone_target() {
        let paths = ToolPaths::default().with_artifact_dir("/data");
        assert_eq!(
            paths.clone_target("https://github.com/owner/project.git"),
            PathBuf::from("/data/project")
        );
        assert_eq!(
            paths.clone_target("git@github.com:owner/project.git"),
            PathBuf::from("/data/project")
        );
        assert_eq!(
            paths.clone_target("https://github.com/owner/project/"),
            PathBuf::from("/data/project")
        );
        assert_eq!(paths.clone_target(".git"), PathBuf::from("/data/repository"));
    }

    #[test]
    fn test_ensure_artifact_dir_creates_parents() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("toolbench_artifacts");
        let paths = ToolPaths::default().with_artifact_dir(&dir);

        paths.ensure_artifact_dir().unwrap();
        assert!(dir.is_dir());
        // Already there is fine
        paths.ensure_artifact_dir().unwrap();
    }

    #[test]
    fn test_ensure_artifact_dir_fails_under_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let paths = ToolPaths::default().with_artifact_dir(file.join("artifacts"));
        assert!(paths.ensure_artifact_dir().is_err());
    }

    #[test]
    fn test_payload_target() {
        let paths = ToolPaths::default().with_artifact_dir("/data");
        assert_eq!(paths.payload_target("raw"), PathBuf::from("/data/payload.apk"));
        assert_eq!(paths.payload_target("exe"), PathBuf::from("/data/payload.exe"));
        assert_eq!(paths.payload_target("../x"), PathBuf::from("/data/payload.bin"));
    }

    #[test]
    fn test_subdomain_list() {
        let paths = ToolPaths::default();
        assert_eq!(
            paths.subdomain_list("example.com"),
            PathBuf::from("/tmp/toolbench_artifacts/subfinder_example.com.txt")
        );
        assert_eq!(
            paths.subdomain_list("../../etc/x"),
            PathBuf::from("/tmp/toolbench_artifacts/subfinder__.._etc_x.txt")
        );
    }
}
