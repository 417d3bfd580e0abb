use rand::RngCore;
use rand::seq::SliceRandom;
use tracing::debug;
use uxstudy_core::Condition;

use crate::catalogue::{InstructionCatalogue, TrialSequence};
use crate::error::{StudyError, StudyResult};
use crate::ports::{ButtonSurface, VoiceRecognizer};

/// Condition-specific behaviour behind the state machine.
pub trait ConditionAdapter {
    fn condition(&self) -> Condition;

    /// Prepares the condition's input. Called once per condition start.
    fn on_start(
        &mut self,
        catalogue: &InstructionCatalogue,
        rng: &mut dyn RngCore,
    ) -> StudyResult<()>;

    /// Text shown to the participant for `turn`.
    fn instruction_for_trial(&self, sequence: &TrialSequence, turn: usize) -> StudyResult<String>;

    fn set_input_enabled(&mut self, enabled: bool);

    fn on_end(&mut self) {}
}

/// Spoken keyword selection.
pub struct VoiceAdapter {
    recognizer: Box<dyn VoiceRecognizer>,
    listening: bool,
}

impl VoiceAdapter {
    pub fn new(recognizer: Box<dyn VoiceRecognizer>) -> Self {
        Self {
            recognizer,
            listening: false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl ConditionAdapter for VoiceAdapter {
    fn condition(&self) -> Condition {
        Condition::Voice
    }

    fn on_start(
        &mut self,
        catalogue: &InstructionCatalogue,
        _rng: &mut dyn RngCore,
    ) -> StudyResult<()> {
        let keywords: Vec<String> = catalogue.names().iter().map(|n| n.to_lowercase()).collect();
        self.recognizer.start_recognizer(&keywords);
        self.listening = true;
        Ok(())
    }

    fn instruction_for_trial(&self, sequence: &TrialSequence, turn: usize) -> StudyResult<String> {
        sequence.name_at(turn).map(str::to_string)
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn on_end(&mut self) {
        if self.listening {
            self.recognizer.stop_recognizer();
            self.listening = false;
        }
    }
}

/// How a button panel orders its labels at condition start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLayout {
    CatalogueOrder,
    Shuffled,
}

/// A button panel: the touchscreen menu or the controller menu.
pub struct ButtonAdapter {
    condition: Condition,
    surface: Box<dyn ButtonSurface>,
    layout: ButtonLayout,
    labels: Vec<String>,
    input_enabled: bool,
}

impl ButtonAdapter {
    pub fn new(condition: Condition, surface: Box<dyn ButtonSurface>, layout: ButtonLayout) -> Self {
        Self {
            condition,
            surface,
            layout,
            labels: Vec::new(),
            input_enabled: true,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_for_button(&self, index: usize) -> StudyResult<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(StudyError::IndexOutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }
}

impl ConditionAdapter for ButtonAdapter {
    fn condition(&self) -> Condition {
        self.condition
    }

    fn on_start(
        &mut self,
        catalogue: &InstructionCatalogue,
        rng: &mut dyn RngCore,
    ) -> StudyResult<()> {
        self.labels = catalogue.names().to_vec();
        if self.layout == ButtonLayout::Shuffled {
            self.labels.shuffle(rng);
        }
        debug!(condition = %self.condition, labels = ?self.labels, "button layout rebuilt");
        self.surface.set_labels(&self.labels);
        Ok(())
    }

    // The target index names a button position, so the instruction is whatever
    // label that button currently carries.
    fn instruction_for_trial(&self, sequence: &TrialSequence, turn: usize) -> StudyResult<String> {
        let index = sequence.index_at(turn)?;
        self.label_for_button(index).map(str::to_string)
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.surface.set_interactable(enabled);
    }
}

/// No interaction device; instructions come straight from the name stream.
#[derive(Debug, Default)]
pub struct BaselineAdapter;

impl ConditionAdapter for BaselineAdapter {
    fn condition(&self) -> Condition {
        Condition::Baseline
    }

    fn on_start(
        &mut self,
        _catalogue: &InstructionCatalogue,
        _rng: &mut dyn RngCore,
    ) -> StudyResult<()> {
        Ok(())
    }

    fn instruction_for_trial(&self, sequence: &TrialSequence, turn: usize) -> StudyResult<String> {
        sequence.name_at(turn).map(str::to_string)
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}
}

/// One adapter per condition.
pub struct ConditionAdapters {
    pub voice: VoiceAdapter,
    pub touchscreen: ButtonAdapter,
    pub controller: ButtonAdapter,
    pub baseline: BaselineAdapter,
}

impl ConditionAdapters {
    pub fn get(&self, condition: Condition) -> &dyn ConditionAdapter {
        match condition {
            Condition::Voice => &self.voice,
            Condition::Touchscreen => &self.touchscreen,
            Condition::Controller => &self.controller,
            Condition::Baseline => &self.baseline,
        }
    }

    pub fn get_mut(&mut self, condition: Condition) -> &mut dyn ConditionAdapter {
        match condition {
            Condition::Voice => &mut self.voice,
            Condition::Touchscreen => &mut self.touchscreen,
            Condition::Controller => &mut self.controller,
            Condition::Baseline => &mut self.baseline,
        }
    }

    pub fn buttons(&self, condition: Condition) -> Option<&ButtonAdapter> {
        match condition {
            Condition::Touchscreen => Some(&self.touchscreen),
            Condition::Controller => Some(&self.controller),
            Condition::Voice | Condition::Baseline => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct PanelLog {
        labels: Vec<String>,
        interactable: Vec<bool>,
    }

    #[derive(Clone, Default)]
    struct FakePanel(Rc<RefCell<PanelLog>>);

    impl ButtonSurface for FakePanel {
        fn set_labels(&mut self, labels: &[String]) {
            self.0.borrow_mut().labels = labels.to_vec();
        }
        fn set_interactable(&mut self, interactable: bool) {
            self.0.borrow_mut().interactable.push(interactable);
        }
    }

    #[derive(Clone, Default)]
    struct FakeRecognizer(Rc<RefCell<Vec<String>>>);

    impl VoiceRecognizer for FakeRecognizer {
        fn start_recognizer(&mut self, keywords: &[String]) {
            self.0.borrow_mut().push(format!("start {}", keywords.join(",")));
        }
        fn stop_recognizer(&mut self) {
            self.0.borrow_mut().push("stop".into());
        }
    }

    fn catalogue() -> InstructionCatalogue {
        InstructionCatalogue::from_names(vec!["Music".into(), "Calls".into(), "Maps".into()])
            .unwrap()
    }

    #[test]
    fn buttons_project_target_index_through_layout() {
        let panel = FakePanel::default();
        let mut adapter = ButtonAdapter::new(
            Condition::Touchscreen,
            Box::new(panel.clone()),
            ButtonLayout::Shuffled,
        );
        adapter
            .on_start(&catalogue(), &mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(panel.0.borrow().labels, adapter.labels());

        let seq = TrialSequence::from_parts(
            vec![2, 0],
            vec!["Maps".into(), "Music".into()],
        );
        assert_eq!(
            adapter.instruction_for_trial(&seq, 0).unwrap(),
            adapter.labels()[2]
        );
        assert!(matches!(
            adapter.instruction_for_trial(&seq, 2),
            Err(StudyError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn catalogue_order_layout_keeps_names() {
        let mut adapter = ButtonAdapter::new(
            Condition::Controller,
            Box::new(FakePanel::default()),
            ButtonLayout::CatalogueOrder,
        );
        adapter
            .on_start(&catalogue(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(adapter.labels(), ["Music", "Calls", "Maps"]);
        assert_eq!(adapter.label_for_button(1).unwrap(), "Calls");
    }

    #[test]
    fn enabling_twice_stays_enabled() {
        let panel = FakePanel::default();
        let mut adapter = ButtonAdapter::new(
            Condition::Touchscreen,
            Box::new(panel.clone()),
            ButtonLayout::CatalogueOrder,
        );
        adapter.set_input_enabled(false);
        adapter.set_input_enabled(true);
        adapter.set_input_enabled(true);
        assert!(adapter.input_enabled());
        assert_eq!(panel.0.borrow().interactable, vec![false, true, true]);
    }

    #[test]
    fn voice_starts_and_stops_recognizer_once() {
        let recognizer = FakeRecognizer::default();
        let mut adapter = VoiceAdapter::new(Box::new(recognizer.clone()));
        adapter
            .on_start(&catalogue(), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(adapter.is_listening());
        adapter.on_end();
        adapter.on_end();
        assert_eq!(
            *recognizer.0.borrow(),
            vec!["start music,calls,maps".to_string(), "stop".to_string()]
        );
    }

    #[test]
    fn voice_and_baseline_read_name_stream() {
        let seq = TrialSequence::from_parts(vec![1], vec!["Calls".into()]);
        let voice = VoiceAdapter::new(Box::new(FakeRecognizer::default()));
        assert_eq!(voice.instruction_for_trial(&seq, 0).unwrap(), "Calls");
        assert_eq!(BaselineAdapter.instruction_for_trial(&seq, 0).unwrap(), "Calls");
        assert!(BaselineAdapter.instruction_for_trial(&seq, 1).is_err());
    }
}
