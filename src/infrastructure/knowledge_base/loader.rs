//! Loads text documents from disk as paragraph chunks

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{DomainError, Document};

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Reads `.txt` and `.md` files and splits them into paragraph chunks
///
/// Each chunk carries the originating `file_name` and its `chunk_index` as
/// metadata, and the file path as its source.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    chunk_size: usize,
}

impl DocumentLoader {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Load every supported file directly inside `dir`, in file name order
    pub async fn load_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<Document>, DomainError> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            DomainError::knowledge_base(format!("Cannot read {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::knowledge_base(e.to_string()))?
        {
            let path = entry.path();
            if path.is_file() && is_supported(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::new();
        for path in paths {
            match self.load_file(&path).await {
                Ok(chunks) => documents.extend(chunks),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        info!(dir = %dir.display(), chunks = documents.len(), "Documents loaded");
        Ok(documents)
    }

    /// Load a single file as chunks
    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<Document>, DomainError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::knowledge_base(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let documents: Vec<Document> = chunk_paragraphs(&content, self.chunk_size)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                Document::new(format!("{}#{}", file_name, i), chunk)
                    .with_metadata("file_name", file_name.as_str())
                    .with_metadata("chunk_index", i)
                    .with_metadata("source", path.display().to_string())
            })
            .collect();

        debug!(file = %file_name, chunks = documents.len(), "Document chunked");
        Ok(documents)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Greedily merge blank-line separated paragraphs up to `chunk_size` characters
///
/// A single paragraph longer than `chunk_size` is split on character
/// boundaries.
pub fn chunk_paragraphs(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let paragraphs = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in paragraphs {
        let len = paragraph.chars().count();

        if len > chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = paragraph.chars().collect();
            chunks.extend(chars.chunks(chunk_size).map(|c| c.iter().collect::<String>()));
            continue;
        }

        if current.is_empty() {
            current.push_str(paragraph);
            current_len = len;
        } else if current_len + 2 + len <= chunk_size {
            current.push_str("\n\n");
            current.push_str(paragraph);
            current_len += 2 + len;
        } else {
            chunks.push(std::mem::replace(&mut current, paragraph.to_string()));
            current_len = len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        assert!(chunk_paragraphs("", 100).is_empty());
        assert!(chunk_paragraphs("\n\n  \n\n", 100).is_empty());
    }

    #[test]
    fn test_paragraphs_combined_to_chunk_size() {
        let chunks = chunk_paragraphs("Short para.\n\nAnother short.\n\nOne more.", 30);

        assert_eq!(chunks, vec!["Short para.\n\nAnother short.", "One more."]);
    }

    #[test]
    fn test_long_paragraph_is_split() {
        let long = "x".repeat(25);
        let chunks = chunk_paragraphs(&format!("intro\n\n{}", long), 10);

        assert_eq!(chunks[0], "intro");
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_multiple_newlines() {
        let chunks = chunk_paragraphs("Para one.\n\n\n\nPara two.", 1000);
        assert_eq!(chunks, vec!["Para one.\n\nPara two."]);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("notes.md")));
        assert!(is_supported(Path::new("README.TXT")));
        assert!(!is_supported(Path::new("image.png")));
        assert!(!is_supported(Path::new("Makefile")));
    }

    #[tokio::test]
    async fn test_load_dir_reads_supported_files() {
        let dir = std::env::temp_dir().join(format!("rag-loader-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("b.md"), "Beta paragraph.\n\nSecond beta.")
            .await
            .unwrap();
        tokio::fs::write(dir.join("a.txt"), "Alpha.").await.unwrap();
        tokio::fs::write(dir.join("skip.bin"), "ignored").await.unwrap();

        let documents = DocumentLoader::new(1200).load_dir(&dir).await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, "a.txt#0");
        assert_eq!(documents[0].metadata["file_name"], "a.txt");
        assert_eq!(documents[1].content, "Beta paragraph.\n\nSecond beta.");
        assert!(documents[1].metadata_str("source").unwrap().ends_with("b.md"));
    }

    #[tokio::test]
    async fn test_load_missing_dir_fails() {
        let result = DocumentLoader::new(100)
            .load_dir("/definitely/not/a/real/dir")
            .await;

        assert!(matches!(result, Err(DomainError::KnowledgeBase(_))));
    }
}
