//! Application configuration.
//!
//! Read from a TOML file. Every field is optional; missing fields take the
//! defaults below, which describe the LAT paper layout.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::session::SubjectWeight;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Overrides the data directory when set.
pub const HOME_ENV_VAR: &str = "LAT_PREP_HOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON question bank.
    #[serde(default = "default_questions_path")]
    pub questions_path: PathBuf,
    /// Where history and the log file live. Resolved by [`AppConfig::data_dir`].
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible shuffles.
    #[serde(default)]
    pub seed: Option<u64>,
    /// `tracing` filter used when `LAT_PREP_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub exam: ExamConfig,
    /// Subjects offered on the menu.
    #[serde(default = "default_subjects")]
    pub subjects: Vec<SubjectEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_path: default_questions_path(),
            data_dir: None,
            seed: None,
            log_filter: default_log_filter(),
            exam: ExamConfig::default(),
            subjects: default_subjects(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_weights")]
    pub weights: Vec<SubjectWeight>,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            weights: default_weights(),
        }
    }
}

/// A menu entry: display label plus the subject value used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub label: String,
    pub subject: String,
}

impl SubjectEntry {
    pub fn new(label: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            subject: subject.into(),
        }
    }
}

fn default_questions_path() -> PathBuf {
    PathBuf::from("questions.json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

const fn default_duration_secs() -> u64 {
    30 * 60
}

fn default_weights() -> Vec<SubjectWeight> {
    vec![
        SubjectWeight::new("english", 20),
        SubjectWeight::new("general knowledge", 20),
        SubjectWeight::new("islamic", 10),
        SubjectWeight::new("pakistan", 10),
        SubjectWeight::new("urdu", 10),
        SubjectWeight::new("math", 5),
    ]
}

fn default_subjects() -> Vec<SubjectEntry> {
    vec![
        SubjectEntry::new("English", "english"),
        SubjectEntry::new("General Knowledge", "general knowledge"),
        SubjectEntry::new("Islamic Studies", "islamic"),
        SubjectEntry::new("Pakistan Studies", "pakistan"),
        SubjectEntry::new("Urdu", "urdu"),
        SubjectEntry::new("Math (Basic)", "math"),
    ]
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "lat-prep")
}

/// Default config file location, e.g. `~/.config/lat-prep/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Loads `path` when given (it must exist), else the default location if
    /// a file is there, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    /// Order of precedence: `data_dir` field, `LAT_PREP_HOME`, the OS data
    /// directory.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Ok(dir) = env::var(HOME_ENV_VAR) {
            return Ok(PathBuf::from(dir));
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoHomeDirectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.exam.duration_secs, 1800);
        assert_eq!(cfg.exam.weights.len(), 6);
        assert_eq!(cfg.exam.weights.iter().map(|w| w.count).sum::<usize>(), 75);
        assert_eq!(cfg.subjects.len(), 6);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn menu_subjects_match_exam_subjects() {
        let cfg = AppConfig::default();
        for entry in &cfg.subjects {
            assert!(
                cfg.exam.weights.iter().any(|w| w.subject == entry.subject),
                "{} has no exam weight",
                entry.subject
            );
        }
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            seed = 7

            [exam]
            duration_secs = 600

            [[exam.weights]]
            subject = "english"
            count = 2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.exam.duration_secs, 600);
        assert_eq!(cfg.exam.weights, vec![SubjectWeight::new("english", 2)]);
        assert_eq!(cfg.questions_path, PathBuf::from("questions.json"));
        assert_eq!(cfg.subjects.len(), 6);
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "exam = 3").unwrap();
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/lat")),
            ..AppConfig::default()
        };
        assert_eq!(cfg.data_dir().unwrap(), PathBuf::from("/tmp/lat"));
    }
}
