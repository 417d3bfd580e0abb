use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uxstudy_core::NOT_APPLICABLE_SENTINEL;

use crate::error::{StudyError, StudyResult};

pub const DEFAULT_INSTRUCTION_NAMES: [&str; 6] =
    ["Music", "Calls", "Maps", "News", "Weather", "Terrain"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// How many times every catalogue entry appears in the trial sequence.
    pub instruction_multiplication_number: u32,
    /// Input lockout after each selection, in seconds.
    pub inter_selection_pause_secs: f32,
    pub instruction_names: Vec<String>,
    pub shuffle_button_layout: bool,
    pub seed: Option<u64>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            instruction_multiplication_number: 3,
            inter_selection_pause_secs: 0.5,
            instruction_names: DEFAULT_INSTRUCTION_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            shuffle_button_layout: true,
            seed: None,
        }
    }
}

impl StudyConfig {
    pub fn from_json_str(raw: &str) -> StudyResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| StudyError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> StudyResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StudyError::Configuration(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> StudyResult<()> {
        if self.instruction_multiplication_number == 0 {
            return Err(StudyError::Configuration(
                "instruction_multiplication_number must be at least 1".into(),
            ));
        }
        if self.instruction_names.is_empty() {
            return Err(StudyError::Configuration(
                "instruction_names must not be empty".into(),
            ));
        }
        // Indices run 0..len and must stay below the log's "not applicable" value.
        if self.instruction_names.len() > NOT_APPLICABLE_SENTINEL as usize {
            return Err(StudyError::Configuration(format!(
                "at most {NOT_APPLICABLE_SENTINEL} instruction names are supported, got {}",
                self.instruction_names.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self
            .instruction_names
            .iter()
            .find(|name| !seen.insert(name.as_str()))
        {
            return Err(StudyError::Configuration(format!(
                "duplicate instruction name {dup:?}"
            )));
        }
        self.inter_selection_pause()?;
        Ok(())
    }

    pub fn inter_selection_pause(&self) -> StudyResult<Duration> {
        Duration::try_from_secs_f32(self.inter_selection_pause_secs).map_err(|_| {
            StudyError::Configuration(format!(
                "inter_selection_pause_secs must be a finite, non-negative number (got {})",
                self.inter_selection_pause_secs
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_study_protocol() {
        let config = StudyConfig::default();
        assert_eq!(config.instruction_multiplication_number, 3);
        assert_eq!(config.inter_selection_pause().unwrap(), Duration::from_millis(500));
        assert_eq!(config.instruction_names.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = StudyConfig::from_json_str(r#"{ "inter_selection_pause_secs": 0.25 }"#).unwrap();
        assert_eq!(config.instruction_multiplication_number, 3);
        assert_eq!(config.inter_selection_pause().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn rejects_zero_multiplier() {
        let err = StudyConfig::from_json_str(r#"{ "instruction_multiplication_number": 0 }"#)
            .unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
    }

    #[test]
    fn rejects_negative_multiplier_at_parse_time() {
        let err = StudyConfig::from_json_str(r#"{ "instruction_multiplication_number": -2 }"#)
            .unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
    }

    #[test]
    fn rejects_duplicate_names_and_bad_pause() {
        let dup = StudyConfig {
            instruction_names: vec!["Maps".into(), "Maps".into()],
            ..StudyConfig::default()
        };
        assert!(matches!(dup.validate(), Err(StudyError::Configuration(_))));

        let negative = StudyConfig {
            inter_selection_pause_secs: -0.5,
            ..StudyConfig::default()
        };
        assert!(matches!(negative.validate(), Err(StudyError::Configuration(_))));
    }

    #[test]
    fn rejects_catalogues_reaching_the_sentinel_index() {
        let names = |n: usize| (0..n).map(|i| format!("Item {i}")).collect::<Vec<_>>();
        let largest = StudyConfig {
            instruction_names: names(404),
            ..StudyConfig::default()
        };
        assert!(largest.validate().is_ok());

        let too_many = StudyConfig {
            instruction_names: names(405),
            ..StudyConfig::default()
        };
        assert!(matches!(too_many.validate(), Err(StudyError::Configuration(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "instruction_names": ["Music", "Calls", "Maps"], "seed": 7 }}"#
        )
        .unwrap();
        let config = StudyConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.instruction_names, vec!["Music", "Calls", "Maps"]);
        assert_eq!(config.seed, Some(7));
    }
}
