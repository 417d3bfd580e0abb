//! Collaborators the state machine drives but does not implement.

use std::io;

use uxstudy_core::{Condition, LogRow};

use crate::catalogue::TrialSequence;

/// Instruction display and menu navigation.
pub trait Presenter {
    fn show_instruction(&mut self, text: &str);
    fn set_main_menu_visible(&mut self, visible: bool);
    fn set_condition_menu_visible(&mut self, condition: Condition, visible: bool);
    /// Gates the four condition-entry buttons.
    fn set_condition_selectors_enabled(&mut self, enabled: bool);
}

/// Destination for study log rows.
pub trait LogSink {
    fn init(&mut self, participant_number: u32) -> io::Result<()>;
    fn write_row(&mut self, row: &LogRow) -> io::Result<()>;
    fn write_instruction_sequence(&mut self, sequence: &TrialSequence) -> io::Result<()>;
}

/// Fire-and-forget sound playback.
pub trait AudioCue {
    fn play(&mut self, cue: &str);
}

pub trait VoiceRecognizer {
    fn start_recognizer(&mut self, keywords: &[String]);
    fn stop_recognizer(&mut self);
}

/// A panel of selectable buttons (on-screen or on a controller).
pub trait ButtonSurface {
    fn set_labels(&mut self, labels: &[String]);
    fn set_interactable(&mut self, interactable: bool);
}

/// Keeps every row in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    pub participant_number: Option<u32>,
    pub rows: Vec<LogRow>,
    pub sequences: Vec<TrialSequence>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection_rows(&self) -> impl Iterator<Item = &LogRow> {
        self.rows.iter().filter(|row| !row.is_marker())
    }

    pub fn tags(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.tag.as_str()).collect()
    }
}

impl LogSink for MemoryLogSink {
    fn init(&mut self, participant_number: u32) -> io::Result<()> {
        self.participant_number = Some(participant_number);
        Ok(())
    }

    fn write_row(&mut self, row: &LogRow) -> io::Result<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn write_instruction_sequence(&mut self, sequence: &TrialSequence) -> io::Result<()> {
        self.sequences.push(sequence.clone());
        Ok(())
    }
}
