use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Condition;

/// Value written to index columns of rows where an index does not apply.
pub const NOT_APPLICABLE_SENTINEL: i64 = 404;

/// Progress of the active condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialState {
    /// 0-based cursor into the trial sequence.
    pub turn_number: usize,
    pub current_condition: Option<Condition>,
    pub running: bool,
}

impl TrialState {
    pub fn begin(&mut self, condition: Condition) {
        self.turn_number = 0;
        self.current_condition = Some(condition);
        self.running = true;
    }

    pub fn freeze(&mut self) {
        self.running = false;
    }
}

/// An index column of a log row.
///
/// `At(404)` is written as the sentinel and reads back as `NotApplicable`;
/// study configurations are limited to 404 entries (indices 0..=403) so the
/// two never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexField {
    At(usize),
    NotApplicable,
}

impl IndexField {
    pub fn as_sentinel(&self) -> i64 {
        match self {
            Self::At(i) => *i as i64,
            Self::NotApplicable => NOT_APPLICABLE_SENTINEL,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::At(i) => Some(*i),
            Self::NotApplicable => None,
        }
    }
}

impl From<usize> for IndexField {
    fn from(i: usize) -> Self {
        Self::At(i)
    }
}

impl fmt::Display for IndexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(i) => write!(f, "{i}"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for IndexField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_sentinel())
    }
}

impl<'de> Deserialize<'de> for IndexField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw == NOT_APPLICABLE_SENTINEL || raw < 0 {
            Ok(Self::NotApplicable)
        } else {
            Ok(Self::At(raw as usize))
        }
    }
}

/// Outcome of one participant selection. Written once, never retained by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub selected_item: String,
    pub target_item: String,
    pub selected_index: IndexField,
    pub target_index: IndexField,
    pub is_correct: bool,
    pub condition: Condition,
}

/// Logical shape of one log row, shared by marker rows and selection rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub tag: String,
    pub item: String,
    pub target: String,
    pub selected_index: IndexField,
    pub target_index: IndexField,
    pub is_correct: bool,
}

impl LogRow {
    pub const START_EXPERIMENT: &'static str = "[START EXPERIMENT]";

    /// A non-trial row marking the start or end of the experiment or a condition.
    pub fn marker(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            item: "N/A".to_string(),
            target: "N/A".to_string(),
            selected_index: IndexField::NotApplicable,
            target_index: IndexField::NotApplicable,
            is_correct: true,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.tag.starts_with("[START") || self.tag.starts_with("[END")
    }
}

impl From<&SelectionRecord> for LogRow {
    fn from(record: &SelectionRecord) -> Self {
        Self {
            tag: record.condition.selection_tag(),
            item: record.selected_item.clone(),
            target: record.target_item.clone(),
            selected_index: record.selected_index,
            target_index: record.target_index,
            is_correct: record.is_correct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_resets_progress() {
        let mut state = TrialState {
            turn_number: 7,
            current_condition: Some(Condition::Voice),
            running: false,
        };
        state.begin(Condition::Controller);
        assert_eq!(state.turn_number, 0);
        assert_eq!(state.current_condition, Some(Condition::Controller));
        assert!(state.running);

        state.freeze();
        assert!(!state.running);
        assert_eq!(state.current_condition, Some(Condition::Controller));
    }

    #[test]
    fn index_404_reads_back_as_not_applicable() {
        let field: IndexField = serde_json::from_str("404").unwrap();
        assert_eq!(field, IndexField::NotApplicable);
        let field: IndexField = serde_json::from_str("403").unwrap();
        assert_eq!(field, IndexField::At(403));
    }

    #[test]
    fn marker_rows_use_sentinel_indices() {
        let row = LogRow::marker(LogRow::START_EXPERIMENT);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["selected_index"], 404);
        assert_eq!(json["target_index"], 404);
        assert_eq!(json["item"], "N/A");
        assert!(row.is_marker());
    }

    #[test]
    fn selection_rows_carry_both_indices() {
        let record = SelectionRecord {
            selected_item: "Maps".into(),
            target_item: "Calls".into(),
            selected_index: IndexField::At(2),
            target_index: IndexField::At(1),
            is_correct: false,
            condition: Condition::Touchscreen,
        };
        let row = LogRow::from(&record);
        assert_eq!(row.tag, "[TOUCHSCREEN]");
        assert_eq!(row.selected_index.index(), Some(2));
        assert_eq!(row.target_index.to_string(), "1");
        assert!(!row.is_marker());

        let back: LogRow = serde_json::from_str(&serde_json::to_string(&row).unwrap()).unwrap();
        assert_eq!(back, row);
    }
}
