use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shop_capture::{SidebarEntry, SidebarSource, SidebarView};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SidebarFileError {
    #[error("failed to read sidebar snapshot `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse sidebar snapshot `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk sidebar state, as written by whatever mirrors the game client.
///
/// ```toml
/// [[entries]]
/// score = 3
/// owner = "#claim"
/// prefix = "§e["
/// display_name = "Market"
/// suffix = "§e]"
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarSnapshot {
    pub hidden: bool,
    pub entries: Vec<SidebarEntry>,
}

impl SidebarSnapshot {
    pub fn into_view(self) -> SidebarView {
        if self.hidden {
            SidebarView::Hidden
        } else {
            SidebarView::Shown(self.entries)
        }
    }
}

/// Sidebar source backed by a TOML snapshot that is re-read on every lookup.
///
/// Without a path the client is treated as unreachable.
#[derive(Debug, Clone, Default)]
pub struct SidebarFile {
    path: Option<PathBuf>,
}

impl SidebarFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<SidebarView, SidebarFileError> {
        match &self.path {
            Some(path) => read_snapshot(path).map(SidebarSnapshot::into_view),
            None => Ok(SidebarView::Unavailable),
        }
    }
}

impl SidebarSource for SidebarFile {
    fn sidebar(&self) -> SidebarView {
        self.load().unwrap_or_else(|err| {
            warn!(error = %err, "sidebar snapshot unavailable");
            SidebarView::Unavailable
        })
    }
}

fn read_snapshot(path: &Path) -> Result<SidebarSnapshot, SidebarFileError> {
    let text = fs::read_to_string(path).map_err(|source| SidebarFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| SidebarFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use shop_capture::{lookup_claim, Claim};
    use tempfile::NamedTempFile;

    use super::*;

    fn snapshot_file(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), contents).expect("write snapshot");
        file
    }

    #[test]
    fn reads_entries_and_resolves_claim() {
        let file = snapshot_file(
            r##"
[[entries]]
score = 1
owner = "#claim"
prefix = "§e["
display_name = "Market"
suffix = "§e]"

[[entries]]
score = 2
owner = "#label"
display_name = "§7Current Claim:"
"##,
        );
        let source = SidebarFile::new(Some(file.path().to_path_buf()));

        let SidebarView::Shown(entries) = source.load().expect("load") else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(lookup_claim(&source), Claim::Value("Market".to_string()));
    }

    #[test]
    fn hidden_flag_wins_over_entries() {
        let file = snapshot_file("hidden = true\n[[entries]]\nscore = 1\nowner = \"x\"\n");
        let source = SidebarFile::new(Some(file.path().to_path_buf()));
        assert_eq!(source.sidebar(), SidebarView::Hidden);
    }

    #[test]
    fn missing_path_or_file_is_unavailable() {
        assert_eq!(SidebarFile::new(None).sidebar(), SidebarView::Unavailable);

        let gone = SidebarFile::new(Some(PathBuf::from("/definitely/not/sidebar.toml")));
        assert!(matches!(gone.load(), Err(SidebarFileError::Read { .. })));
        assert_eq!(gone.sidebar(), SidebarView::Unavailable);
    }

    #[test]
    fn malformed_snapshot_is_a_parse_error() {
        let file = snapshot_file("entries = 3\n");
        let source = SidebarFile::new(Some(file.path().to_path_buf()));
        assert!(matches!(source.load(), Err(SidebarFileError::Parse { .. })));
    }
}
