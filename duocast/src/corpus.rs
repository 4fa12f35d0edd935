//! Reading directories of plain-text summaries.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Sorted `.txt` files directly inside `dir`.
async fn text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_txt && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Concatenate every `.txt` file in `dir`, in name order.
///
/// Each file is trimmed; files are separated by a blank line.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or a file cannot be read.
pub async fn read_text_dir(dir: &Path) -> Result<String> {
    if !dir.is_dir() {
        return Err(Error::document(format!(
            "summary directory not found: {}",
            dir.display()
        )));
    }

    let mut parts = Vec::new();
    for path in text_files(dir).await? {
        let content = tokio::fs::read_to_string(&path).await?;
        debug!(path = %path.display(), chars = content.chars().count(), "read summary file");
        parts.push(content.trim().to_owned());
    }

    Ok(parts.join("\n\n"))
}

/// Merge the `.txt` files of `dir` into `output`, each under a header naming
/// its source. Returns the number of files merged.
///
/// `output` is skipped when it lives in `dir` itself.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be read, or the output
/// cannot be written.
pub async fn combine_text_files(dir: &Path, output: &Path) -> Result<usize> {
    let output_name = output.file_name();
    let same_dir = output
        .parent()
        .is_some_and(|parent| same_path(parent, dir));

    let files: Vec<PathBuf> = text_files(dir)
        .await?
        .into_iter()
        .filter(|path| !(same_dir && path.file_name() == output_name))
        .collect();

    if files.is_empty() {
        warn!(dir = %dir.display(), "no .txt files to combine");
        return Ok(0);
    }

    let mut combined = String::new();
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = tokio::fs::read_to_string(path).await?;
        combined.push_str(&format!("\n--- from file: {name} ---\n\n"));
        combined.push_str(&content);
        combined.push('\n');
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, combined).await?;
    info!(files = files.len(), path = %output.display(), "combined text files");

    Ok(files.len())
}

fn same_path(a: &Path, b: &Path) -> bool {
    let a = if a.as_os_str().is_empty() { Path::new(".") } else { a };
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    async fn write(dir: &Path, name: &str, content: &str) {
        tokio::fs::write(dir.join(name), content).await.unwrap();
    }

    #[tokio::test]
    async fn reads_txt_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", "  second \n").await;
        write(dir.path(), "a.txt", "first\n").await;
        write(dir.path(), "notes.md", "ignored").await;

        let text = read_text_dir(dir.path()).await.unwrap();
        assert_eq!(text, "first\n\nsecond");
    }

    #[tokio::test]
    async fn missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text_dir(&dir.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[tokio::test]
    async fn combine_adds_headers_and_skips_output() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.txt", "alpha").await;
        write(dir.path(), "two.txt", "beta").await;
        let output = dir.path().join("combined.txt");
        write(dir.path(), "combined.txt", "stale").await;

        let count = combine_text_files(dir.path(), &output).await.unwrap();
        assert_eq!(count, 2);

        let merged = tokio::fs::read_to_string(&output).await.unwrap();
        assert_eq!(
            merged,
            "\n--- from file: one.txt ---\n\nalpha\n\n--- from file: two.txt ---\n\nbeta\n"
        );
    }

    #[tokio::test]
    async fn combine_empty_dir_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("combined.txt");

        assert_eq!(combine_text_files(dir.path(), &output).await.unwrap(), 0);
        assert!(!output.exists());
    }
}
