//! Provisioning document loading.
//!
//! # Responsibility
//! - Turn a directory of YAML files into ordered [`NotificationsDocument`]s.
//! - Keep file-system and format concerns out of reconciliation.
//!
//! # Invariants
//! - Documents are returned in file-name order.
//! - Only `*.yaml` and `*.yml` regular files are read.
//!
//! [`NotificationsDocument`]: crate::model::notification::NotificationsDocument

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod reader;

pub use reader::{load_documents, parse_document};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error raised while reading provisioning files.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => write!(
                f,
                "failed to read provisioning file `{}`: {source}",
                path.display()
            ),
            Self::Parse { path, source } => {
                write!(f, "invalid provisioning file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}
