use std::{
    fmt,
    fs::Metadata,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

/// Identity of a palette source image: absolute path, byte length and
/// modification time. Replacing the file in place yields a new key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    /// Stat `path` and build its key. `None` when the file is missing,
    /// unreadable or not a regular file.
    pub fn for_file(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        Self::from_metadata(path, &metadata)
    }

    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Option<Self> {
        let absolute = std::path::absolute(path).ok()?;
        let modified = metadata.modified().ok()?;
        Some(Self::from_parts(&absolute, metadata.len(), modified))
    }

    pub fn from_parts(path: &Path, len: u64, modified: SystemTime) -> Self {
        let nanos = modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(format!("{}|{}|{}", path.display(), len, nanos))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn key_encodes_path_length_and_mtime() {
        let modified = UNIX_EPOCH + Duration::new(1_700_000_000, 250);
        let key =
            CacheKey::from_parts(Path::new("/art/bg.png"), 4096, modified);
        assert_eq!(key.as_str(), "/art/bg.png|4096|1700000000000000250");
    }

    #[test]
    fn any_component_change_changes_the_key() {
        let t0 = UNIX_EPOCH + Duration::from_secs(10);
        let t1 = t0 + Duration::from_nanos(1);
        let base = CacheKey::from_parts(Path::new("/a.png"), 10, t0);

        assert_ne!(base, CacheKey::from_parts(Path::new("/a.png"), 11, t0));
        assert_ne!(base, CacheKey::from_parts(Path::new("/a.png"), 10, t1));
        assert_ne!(base, CacheKey::from_parts(Path::new("/b.png"), 10, t0));
    }

    #[test]
    fn missing_file_has_no_key() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheKey::for_file(&dir.path().join("absent.png")).is_none());
        // Directories are not artwork.
        assert!(CacheKey::for_file(dir.path()).is_none());
    }

    #[test]
    fn rewriting_a_file_with_new_length_changes_its_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"abc").unwrap();
        let first = CacheKey::for_file(&path).unwrap();
        assert!(first.as_str().contains("|3|"));

        std::fs::write(&path, b"abcdef").unwrap();
        let second = CacheKey::for_file(&path).unwrap();
        assert_ne!(first, second);
        assert!(second.as_str().starts_with(&*path.display().to_string()));
    }
}
