//! Forward-slash paths for records in the state directory

use std::fmt;
use std::path::{Path, PathBuf};

/// A path kept with `/` separators.
///
/// Record locations are built by joining entity keys onto a workspace
/// root, so they stay comparable across platforms. Conversion to a native
/// path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Native form for filesystem calls.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Append one or more `/`-separated segments.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let base = self.0.trim_end_matches('/');
        Self(format!("{base}/{}", segment.trim_start_matches('/')))
    }

    /// Extension of the last component; dotfiles have none.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.0).extension().and_then(|ext| ext.to_str())
    }

    pub fn exists(&self) -> bool {
        Path::new(&self.0).exists()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a/b", "c", "a/b/c")]
    #[case("a/b/", "c", "a/b/c")]
    #[case("a\\b", "c\\d", "a/b/c/d")]
    #[case("/state", "workspaces/org-1", "/state/workspaces/org-1")]
    fn join_uses_forward_slashes(#[case] base: &str, #[case] seg: &str, #[case] expected: &str) {
        assert_eq!(NormalizedPath::new(base).join(seg).as_str(), expected);
    }

    #[rstest]
    #[case("mirror/baseline.json", Some("json"))]
    #[case("config.TOML", Some("TOML"))]
    #[case("state/.gitignore", None)]
    #[case("workspaces/org-1", None)]
    fn extension_of_last_component(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(NormalizedPath::new(path).extension(), expected);
    }
}
