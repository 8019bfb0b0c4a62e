//! YAML directory reader for alert notification provisioning files.

use super::{ConfigError, ConfigResult};
use crate::model::notification::NotificationsDocument;
use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Reads every provisioning document under `dir`.
///
/// An unreadable directory is logged and treated as holding no documents, so
/// a missing provisioning directory never blocks startup.
///
/// # Errors
/// - `ConfigError::Read` when a matching file cannot be read.
/// - `ConfigError::Parse` when a matching file is not a valid document.
pub fn load_documents(dir: impl AsRef<Path>) -> ConfigResult<Vec<NotificationsDocument>> {
    let dir = dir.as_ref();
    let files = match config_files(dir) {
        Ok(files) => files,
        Err(err) => {
            error!(
                "event=config_read module=config status=error path={} error={}",
                dir.display(),
                err
            );
            return Ok(Vec::new());
        }
    };

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let document = parse_document(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(
            "event=config_read module=config status=ok path={} notifiers={} delete_notifiers={}",
            path.display(),
            document.notifiers.len(),
            document.delete_notifiers.len()
        );
        documents.push(document);
    }

    Ok(documents)
}

/// Parses one provisioning document. Blank input yields an empty document.
pub fn parse_document(content: &str) -> Result<NotificationsDocument, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(NotificationsDocument::default());
    }
    serde_yaml::from_str(content)
}

fn config_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        // Follows symlinks so mounted config maps (`..data/` links) are read.
        if !fs::metadata(&path)?.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
