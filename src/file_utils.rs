use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use log::debug;

use crate::document::DocumentTree;

// @module: File and directory utilities

/// Extension of serialized document trees
pub const DOCUMENT_EXTENSION: &str = "json";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Export path next to the source, never equal to it
    // @params: input_file, copy_suffix
    //
    // `talk.json` becomes `talk (copy).json`; a file without the document
    // extension keeps its full name and gains the suffix plus the extension.
    pub fn generate_copy_path<P: AsRef<Path>>(input_file: P, copy_suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();
        let file_name = input_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let has_extension = input_file
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCUMENT_EXTENSION));

        let base = if has_extension {
            input_file
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            file_name
        };

        let output_filename = format!("{}{}.{}", base, copy_suffix, DOCUMENT_EXTENSION);
        input_file.with_file_name(output_filename)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a parsed document tree from a JSON file
    pub fn load_document<P: AsRef<Path>>(path: P) -> Result<DocumentTree> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("Document file does not exist: {:?}", path));
        }

        let content = Self::read_to_string(path)?;
        let tree: DocumentTree = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse document: {:?}", path))?;

        debug!(
            "Read {:?}: {} markers, {} tiers",
            path,
            tree.time_markers.len(),
            tree.tiers.len()
        );
        Ok(tree)
    }

    /// Write a document tree as JSON
    pub fn save_document<P: AsRef<Path>>(path: P, tree: &DocumentTree, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(tree)
        } else {
            serde_json::to_string(tree)
        }
        .context("Failed to serialize document")?;

        Self::write_to_file(path, &json)
    }
}
