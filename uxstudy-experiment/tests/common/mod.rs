#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use uxstudy_core::Condition;
use uxstudy_experiment::{
    AudioCue, BaselineAdapter, ButtonAdapter, ButtonLayout, ButtonSurface, Collaborators,
    ConditionAdapters, MemoryLogSink, Presenter, StudyConfig, TrialStateMachine, VoiceAdapter,
    VoiceRecognizer,
};
use uxstudy_timing::ManualTimer;

pub type Machine =
    TrialStateMachine<RecordingPresenter, MemoryLogSink, CountingAudio, ManualTimer, StdRng>;

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Instruction(String),
    MainMenu(bool),
    ConditionMenu(Condition, bool),
    Selectors(bool),
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub events: Vec<Shown>,
}

impl RecordingPresenter {
    pub fn instructions(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Shown::Instruction(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_instruction(&self) -> Option<&str> {
        self.instructions().last().copied()
    }
}

impl Presenter for RecordingPresenter {
    fn show_instruction(&mut self, text: &str) {
        self.events.push(Shown::Instruction(text.to_string()));
    }
    fn set_main_menu_visible(&mut self, visible: bool) {
        self.events.push(Shown::MainMenu(visible));
    }
    fn set_condition_menu_visible(&mut self, condition: Condition, visible: bool) {
        self.events.push(Shown::ConditionMenu(condition, visible));
    }
    fn set_condition_selectors_enabled(&mut self, enabled: bool) {
        self.events.push(Shown::Selectors(enabled));
    }
}

#[derive(Default)]
pub struct CountingAudio {
    pub played: Vec<String>,
}

impl AudioCue for CountingAudio {
    fn play(&mut self, cue: &str) {
        self.played.push(cue.to_string());
    }
}

#[derive(Default)]
pub struct PanelState {
    pub labels: Vec<String>,
    pub interactable: bool,
    pub toggles: Vec<bool>,
}

#[derive(Clone)]
pub struct SharedPanel(pub Rc<RefCell<PanelState>>);

impl SharedPanel {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(PanelState {
            interactable: true,
            ..PanelState::default()
        })))
    }

    pub fn interactable(&self) -> bool {
        self.0.borrow().interactable
    }

    pub fn enable_count(&self) -> usize {
        self.0.borrow().toggles.iter().filter(|&&t| t).count()
    }
}

impl ButtonSurface for SharedPanel {
    fn set_labels(&mut self, labels: &[String]) {
        self.0.borrow_mut().labels = labels.to_vec();
    }
    fn set_interactable(&mut self, interactable: bool) {
        let mut state = self.0.borrow_mut();
        state.interactable = interactable;
        state.toggles.push(interactable);
    }
}

#[derive(Clone, Default)]
pub struct SharedRecognizer(pub Rc<RefCell<Vec<&'static str>>>);

impl VoiceRecognizer for SharedRecognizer {
    fn start_recognizer(&mut self, _keywords: &[String]) {
        self.0.borrow_mut().push("start");
    }
    fn stop_recognizer(&mut self) {
        self.0.borrow_mut().push("stop");
    }
}

pub struct Rig {
    pub machine: Machine,
    pub timer: ManualTimer,
    pub touchscreen: SharedPanel,
    pub controller: SharedPanel,
    pub recognizer: SharedRecognizer,
}

pub fn three_item_config(multiplier: u32) -> StudyConfig {
    StudyConfig {
        instruction_multiplication_number: multiplier,
        instruction_names: vec!["Music".into(), "Calls".into(), "Maps".into()],
        ..StudyConfig::default()
    }
}

pub fn rig(config: StudyConfig, seed: u64) -> Rig {
    let timer = ManualTimer::new();
    let touchscreen = SharedPanel::new();
    let controller = SharedPanel::new();
    let recognizer = SharedRecognizer::default();
    let layout = if config.shuffle_button_layout {
        ButtonLayout::Shuffled
    } else {
        ButtonLayout::CatalogueOrder
    };

    let adapters = ConditionAdapters {
        voice: VoiceAdapter::new(Box::new(recognizer.clone())),
        touchscreen: ButtonAdapter::new(Condition::Touchscreen, Box::new(touchscreen.clone()), layout),
        controller: ButtonAdapter::new(Condition::Controller, Box::new(controller.clone()), layout),
        baseline: BaselineAdapter,
    };
    let collaborators = Collaborators {
        presenter: RecordingPresenter::default(),
        log: MemoryLogSink::new(),
        audio: CountingAudio::default(),
    };
    let mut machine = TrialStateMachine::new(
        config,
        adapters,
        collaborators,
        timer.clone(),
        StdRng::seed_from_u64(seed),
    )
    .expect("valid config");
    machine.set_participant_number(17);

    Rig {
        machine,
        timer,
        touchscreen,
        controller,
        recognizer,
    }
}

pub fn started_rig(config: StudyConfig, seed: u64) -> Rig {
    let mut rig = rig(config, seed);
    rig.machine.start_experiment().expect("experiment starts");
    rig
}
