// On-disk store for raw uploads

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Metadata returned to the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUpload {
    pub filename: String,
    pub originalname: String,
    pub mimetype: String,
}

/// Writes uploads under `<millis since epoch><original extension>`
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    /// Open the store, creating the directory if it does not exist
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `bytes` and report the generated name.
    /// Same-millisecond uploads with the same extension overwrite each other.
    pub fn save(&self, original_name: &str, mimetype: &str, bytes: &[u8]) -> io::Result<StoredUpload> {
        let filename = format!("{}{}", timestamp_millis(), extension_of(original_name));
        fs::write(self.dir.join(&filename), bytes)?;

        Ok(StoredUpload {
            filename,
            originalname: original_name.to_string(),
            mimetype: mimetype.to_string(),
        })
    }

    /// Read a stored upload back as text
    pub fn read_to_string(&self, filename: &str) -> io::Result<String> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid upload name"))?;
        fs::read_to_string(self.dir.join(name))
    }
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Extension including the dot, or empty
fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("rates.csv"), ".csv");
        assert_eq!(extension_of("archive.tar.json"), ".json");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn test_open_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("uploads");
        let store = DatasetStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_save_and_read_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DatasetStore::open(tmp.path()).unwrap();
        let stored = store.save("rates.csv", "text/csv", b"State,Rate\nCA,10%\n").unwrap();

        assert!(stored.filename.ends_with(".csv"));
        let stem = stored.filename.trim_end_matches(".csv");
        assert!(stem.chars().all(|c| c.is_ascii_digit()), "got {}", stored.filename);
        assert_eq!(stored.originalname, "rates.csv");
        assert_eq!(stored.mimetype, "text/csv");
        assert_eq!(store.read_to_string(&stored.filename).unwrap(), "State,Rate\nCA,10%\n");
    }

    #[test]
    fn test_read_rejects_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DatasetStore::open(tmp.path().join("uploads")).unwrap();
        fs::write(tmp.path().join("secret.txt"), "x").unwrap();
        assert!(store.read_to_string("../secret.txt").is_err());
    }

    #[test]
    fn test_stored_upload_json_shape() {
        let stored = StoredUpload {
            filename: "1700000000000.csv".into(),
            originalname: "rates.csv".into(),
            mimetype: "text/csv".into(),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["filename"], "1700000000000.csv");
        assert_eq!(json["originalname"], "rates.csv");
        assert_eq!(json["mimetype"], "text/csv");
    }
}
