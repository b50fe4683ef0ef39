//! Pre-processing for the document-ingestion path: turns `.txt` files into
//! the content strings the pipeline embeds and stores one by one.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Upper bound per content string, in words.
    pub max_words: usize,
    /// Overlap carried between consecutive splits of an oversized paragraph.
    pub overlap_percent: f32,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self { max_words: 300, overlap_percent: 0.2 }
    }
}

/// Splits raw document text into paragraph-sized content strings.
/// Paragraphs are blank-line separated; a paragraph over `max_words` is cut
/// into overlapping word windows so no stored chunk loses its left context.
#[derive(Default)]
pub struct ParagraphSplitter {
    config: SplitterConfig,
}

impl ParagraphSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Walk `data_dir` for `.txt` files (sorted, recursive) and split each
    /// into content strings, in file order.
    pub fn read_directory(&self, data_dir: &Path) -> Result<Vec<String>> {
        let files = list_txt_files(data_dir);
        if files.is_empty() {
            tracing::warn!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut contents = Vec::new();
        for file_path in &files {
            let text = read_file_content(file_path)?;
            contents.extend(self.split(&text));
        }
        tracing::info!(files = files.len(), chunks = contents.len(), "processed ingest directory");
        Ok(contents)
    }

    /// Split one document into content strings. Empty paragraphs are
    /// dropped; the output never contains an empty string.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if paragraph.split_whitespace().count() <= self.config.max_words {
                out.push(paragraph.to_string());
            } else {
                out.extend(self.split_with_overlap(paragraph));
            }
        }
        out
    }

    fn split_with_overlap(&self, paragraph: &str) -> Vec<String> {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        let per_window = self.config.max_words;
        let overlap = (per_window as f32 * self.config.overlap_percent) as usize;
        let mut windows = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + per_window).min(words.len());
            windows.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start = end - overlap;
        }
        windows
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") {
            txt_files.push(path.to_path_buf());
        }
    }
    txt_files.sort();
    txt_files
}
