use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::ConfigError;

pub const DEFAULT_LOG_FILE: &str = "shop_log.txt";
pub const DEFAULT_THRESHOLD: u32 = 20;
pub const DEFAULT_ANALYSIS_SCRIPT: &str = "analyze_data.py";
pub const ANALYSIS_COMMAND_ENV: &str = "SIGNPULLER_PYTHON";
pub const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

pub(crate) fn default_analysis_command() -> PathBuf {
    env::var_os(ANALYSIS_COMMAND_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("python3"))
}

/// Capture settings, read from TOML. Every key is optional.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Host data directory; relative file names resolve against it.
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    /// Records per analysis batch.
    pub threshold: u32,
    pub analysis_command: PathBuf,
    pub analysis_script: PathBuf,
    pub max_line_bytes: usize,
    pub log_level: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            threshold: DEFAULT_THRESHOLD,
            analysis_command: default_analysis_command(),
            analysis_script: PathBuf::from(DEFAULT_ANALYSIS_SCRIPT),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.threshold == 0 {
            return Err(ConfigError::InvalidThreshold(config.threshold));
        }
        Ok(config)
    }

    /// `data_dir` made absolute against the current working directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if self.data_dir.is_absolute() {
            return self.data_dir.clone();
        }
        env::current_dir()
            .map(|cwd| cwd.join(&self.data_dir))
            .unwrap_or_else(|_| self.data_dir.clone())
    }

    pub fn log_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.log_file)
    }

    pub fn analysis_script_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.analysis_script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CaptureConfig::from_toml_str("").expect("parse");
        assert_eq!(config.threshold, 20);
        assert_eq!(config.log_file, PathBuf::from("shop_log.txt"));
        assert_eq!(config.analysis_script, PathBuf::from("analyze_data.py"));
        assert_eq!(config.max_line_bytes, 64 * 1024);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_selected_keys() {
        let config = CaptureConfig::from_toml_str(
            r#"
data_dir = "/srv/game"
threshold = 5
analysis_command = "/usr/bin/python3.12"
"#,
        )
        .expect("parse");
        assert_eq!(config.threshold, 5);
        assert_eq!(config.log_path(), PathBuf::from("/srv/game/shop_log.txt"));
        assert_eq!(
            config.analysis_script_path(),
            PathBuf::from("/srv/game/analyze_data.py")
        );
        assert_eq!(
            config.analysis_command,
            PathBuf::from("/usr/bin/python3.12")
        );
    }

    #[test]
    fn rejects_zero_threshold_and_bad_types() {
        assert!(matches!(
            CaptureConfig::from_toml_str("threshold = 0"),
            Err(ConfigError::InvalidThreshold(0))
        ));
        assert!(matches!(
            CaptureConfig::from_toml_str("threshold = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn relative_data_dir_resolves_against_cwd() {
        let config = CaptureConfig {
            data_dir: PathBuf::from("game"),
            ..CaptureConfig::default()
        };
        assert!(config.resolved_data_dir().is_absolute());
        assert!(config.log_path().ends_with("game/shop_log.txt"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = CaptureConfig::load("/definitely/not/here.toml").expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
