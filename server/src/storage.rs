use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use pdfmark_shared::{decode_annotation_file, encode_annotation_file, AnnotationSet};
use tokio::sync::RwLock;

use crate::error::StorageError;

/// Opaque per-document store. Every save replaces what was there.
#[async_trait]
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing was ever saved for the document.
    async fn load(&self, document_id: &str) -> Result<Option<AnnotationSet>, StorageError>;
    async fn save(&self, document_id: &str, set: &AnnotationSet) -> Result<(), StorageError>;
}

pub struct FileStorage {
    annotation_dir: PathBuf,
    write_seq: AtomicU64,
}

impl FileStorage {
    pub fn new(annotation_dir: PathBuf) -> Self {
        Self {
            annotation_dir,
            write_seq: AtomicU64::new(0),
        }
    }

    /// A fresh temp file per write. Concurrent saves never share one.
    fn temp_path_for(&self, document_id: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.annotation_dir
            .join(format!("{document_id}.bin.{}-{seq}.tmp", std::process::id()))
    }

    fn path_for(&self, document_id: &str) -> PathBuf {
        self.annotation_dir.join(format!("{document_id}.bin"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load(&self, document_id: &str) -> Result<Option<AnnotationSet>, StorageError> {
        let payload = match tokio::fs::read(self.path_for(document_id)).await {
            Ok(payload) => payload,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        Ok(Some(decode_annotation_file(&payload)?))
    }

    async fn save(&self, document_id: &str, set: &AnnotationSet) -> Result<(), StorageError> {
        let payload = encode_annotation_file(set)?;
        tokio::fs::create_dir_all(&self.annotation_dir).await?;
        let path = self.path_for(document_id);
        let temp = self.temp_path_for(document_id);
        if let Err(error) = tokio::fs::write(&temp, payload).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(error.into());
        }
        // Readers see either the old file or the new one, never a partial write.
        if let Err(error) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(error.into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, AnnotationSet>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, document_id: &str) -> Result<Option<AnnotationSet>, StorageError> {
        Ok(self.documents.read().await.get(document_id).cloned())
    }

    async fn save(&self, document_id: &str, set: &AnnotationSet) -> Result<(), StorageError> {
        self.documents
            .write()
            .await
            .insert(document_id.to_string(), set.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmark_shared::{Highlight, PagePoint, Region, Stroke};

    fn sample() -> AnnotationSet {
        AnnotationSet {
            highlights: vec![Highlight {
                id: "1".into(),
                content: "Introduction".into(),
                highlight_area: Region {
                    left: 5.0,
                    top: 10.0,
                    width: 40.0,
                    height: 2.5,
                },
                page_index: 0,
            }],
            strokes: vec![Stroke {
                page_index: 3,
                points: vec![PagePoint { x: 1.0, y: 2.0 }, PagePoint { x: 3.0, y: 4.0 }],
            }],
        }
    }

    #[tokio::test]
    async fn file_storage_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.load("doc-1").await.unwrap(), None);

        storage.save("doc-1", &sample()).await.unwrap();
        assert_eq!(storage.load("doc-1").await.unwrap(), Some(sample()));

        storage.save("doc-1", &AnnotationSet::empty()).await.unwrap();
        assert_eq!(
            storage.load("doc-1").await.unwrap(),
            Some(AnnotationSet::empty())
        );
        let leftovers = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_saves_of_one_document_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = std::sync::Arc::new(FileStorage::new(dir.path().to_path_buf()));
        for _ in 0..20 {
            let first = {
                let storage = storage.clone();
                tokio::spawn(async move { storage.save("doc-1", &sample()).await })
            };
            let second = {
                let storage = storage.clone();
                tokio::spawn(async move { storage.save("doc-1", &AnnotationSet::empty()).await })
            };
            first.await.unwrap().unwrap();
            second.await.unwrap().unwrap();
        }
        let stored = storage.load("doc-1").await.unwrap().unwrap();
        assert!(stored == sample() || stored == AnnotationSet::empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc-1.bin"), b"not an annotation file").unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        assert!(matches!(
            storage.load("doc-1").await,
            Err(StorageError::Codec(_))
        ));
    }

    #[tokio::test]
    async fn memory_storage_keeps_documents_apart() {
        let storage = MemoryStorage::new();
        storage.save("a", &sample()).await.unwrap();
        assert_eq!(storage.load("a").await.unwrap(), Some(sample()));
        assert_eq!(storage.load("b").await.unwrap(), None);
    }
}
