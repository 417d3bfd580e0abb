use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info};
use uxstudy_core::Condition;
use uxstudy_experiment::{AudioCue, ButtonSurface, Presenter, VoiceRecognizer};

/// Prints instructions and menu changes for the experimenter's console.
/// Tracks whether the condition selectors accept a `start`.
#[derive(Debug)]
pub struct ConsolePresenter {
    selectors_enabled: bool,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self {
            selectors_enabled: true,
        }
    }

    pub fn selectors_enabled(&self) -> bool {
        self.selectors_enabled
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for ConsolePresenter {
    fn show_instruction(&mut self, text: &str) {
        println!(">>> {text}");
    }

    fn set_main_menu_visible(&mut self, visible: bool) {
        if visible {
            println!("[menu] start a condition: start voice|touchscreen|controller|baseline");
        }
    }

    fn set_condition_menu_visible(&mut self, condition: Condition, visible: bool) {
        debug!(%condition, visible, "condition menu");
    }

    fn set_condition_selectors_enabled(&mut self, enabled: bool) {
        self.selectors_enabled = enabled;
        debug!(enabled, "condition selectors");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleAudio;

impl AudioCue for ConsoleAudio {
    fn play(&mut self, cue: &str) {
        debug!(cue, "audio cue");
        print!("\x07");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleRecognizer;

impl VoiceRecognizer for ConsoleRecognizer {
    fn start_recognizer(&mut self, keywords: &[String]) {
        info!(?keywords, "keyword recognizer listening");
    }

    fn stop_recognizer(&mut self) {
        info!("keyword recognizer stopped");
    }
}

/// A button panel rendered as a numbered list. The interactable flag is
/// shared with the input loop, which drops presses while it is off.
#[derive(Debug, Clone)]
pub struct ConsolePanel {
    name: &'static str,
    labels: Rc<RefCell<Vec<String>>>,
    interactable: Rc<Cell<bool>>,
}

impl ConsolePanel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            labels: Rc::new(RefCell::new(Vec::new())),
            interactable: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_interactable(&self) -> bool {
        self.interactable.get()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }
}

impl ButtonSurface for ConsolePanel {
    fn set_labels(&mut self, labels: &[String]) {
        *self.labels.borrow_mut() = labels.to_vec();
        let listing: Vec<String> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{i}:{label}"))
            .collect();
        println!("[{}] {}", self.name, listing.join("  "));
    }

    fn set_interactable(&mut self, interactable: bool) {
        self.interactable.set(interactable);
        debug!(panel = self.name, interactable, "panel input");
    }
}
