use crate::errors::ApiError;
use sanitize_filename::sanitize;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub stored_name: String,
    pub original_name: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Blobs are stored under a generated uuid name; the untrusted original
    // name only survives as display metadata and the extension hint.
    pub fn save(&self, original: &str, data: &[u8]) -> Result<StoredBlob, ApiError> {
        let original_safe = safe_name(original);
        let ext = Path::new(&original_safe)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);

        // temp write + rename keeps partial files out of the root
        let tmp = self.root.join(format!("{}.part", stored_name));
        let path = self.root.join(&stored_name);
        std::fs::write(&tmp, data)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(StoredBlob {
            stored_name,
            original_name: original_safe,
            mime_type: infer::get(data).map(|t| t.mime_type().to_string()),
            size_bytes: data.len() as i64,
        })
    }

    pub fn open(&self, stored_name: &str) -> Result<PathBuf, ApiError> {
        let p = self.root.join(stored_name);
        if !p.exists() {
            return Err(ApiError::NotFound);
        }
        Ok(p)
    }

    pub fn remove(&self, stored_name: &str) {
        let _ = std::fs::remove_file(self.root.join(stored_name));
    }
}

fn safe_name(original: &str) -> String {
    let name = sanitize(original);
    if name.is_empty() || name.chars().all(|c| c == '.') {
        "upload.bin".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("uploads")).unwrap();
        (dir, store)
    }

    #[test]
    fn traversal_names_stay_in_root() {
        let (_dir, store) = store();
        let blob = store.save("../../etc/passwd", b"x").unwrap();
        let path = store.open(&blob.stored_name).unwrap();
        assert!(path.starts_with(store.root()));
        assert!(!blob.original_name.contains('/'));
        assert!(!blob.stored_name.contains('/'));
    }

    #[test]
    fn dot_only_names_fall_back() {
        assert_eq!(safe_name(".."), "upload.bin");
        assert_eq!(safe_name(""), "upload.bin");
        assert_eq!(safe_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn no_partial_files_left_behind() {
        let (_dir, store) = store();
        let blob = store.save("notes.pdf", b"data").unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(
            std::fs::read(store.root().join(&blob.stored_name)).unwrap(),
            b"data"
        );
    }

    #[test]
    fn open_missing_blob_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.open("does-not-exist.bin"),
            Err(ApiError::NotFound)
        ));
    }
}
