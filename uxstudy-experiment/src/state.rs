use rand::Rng;
use tracing::{debug, error, info, warn};
use uxstudy_core::{Condition, IndexField, LogRow, SelectionRecord, TrialState, UnknownCondition};
use uxstudy_timing::Timer;

use crate::adapter::ConditionAdapters;
use crate::catalogue::{InstructionCatalogue, TrialSequence};
use crate::config::StudyConfig;
use crate::error::{StudyError, StudyResult};
use crate::lockout::SelectionLockout;
use crate::ports::{AudioCue, LogSink, Presenter};

/// Shown while no condition is running.
pub const WAITING_PLACEHOLDER: &str = "Loading...";
/// Played on every accepted selection, correct or not.
pub const POSITIVE_FEEDBACK_CUE: &str = "BeepPositive";

/// The external collaborators the state machine reports to.
pub struct Collaborators<P, L, A> {
    pub presenter: P,
    pub log: L,
    pub audio: A,
}

/// Sequences instructions for one participant, scores selections and moves
/// between `Idle` (`running == false`) and a running condition.
pub struct TrialStateMachine<P, L, A, T, R>
where
    P: Presenter,
    L: LogSink,
    A: AudioCue,
    T: Timer,
    R: Rng,
{
    config: StudyConfig,
    catalogue: InstructionCatalogue,
    adapters: ConditionAdapters,
    presenter: P,
    log: L,
    audio: A,
    timer: T,
    rng: R,
    participant_number: u32,
    sequence: Option<TrialSequence>,
    state: TrialState,
    lockout: SelectionLockout,
}

impl<P, L, A, T, R> TrialStateMachine<P, L, A, T, R>
where
    P: Presenter,
    L: LogSink,
    A: AudioCue,
    T: Timer,
    R: Rng,
{
    pub fn new(
        config: StudyConfig,
        adapters: ConditionAdapters,
        collaborators: Collaborators<P, L, A>,
        timer: T,
        rng: R,
    ) -> StudyResult<Self> {
        config.validate()?;
        let catalogue = InstructionCatalogue::from_names(config.instruction_names.clone())?;
        let Collaborators {
            presenter,
            log,
            audio,
        } = collaborators;

        Ok(Self {
            config,
            catalogue,
            adapters,
            presenter,
            log,
            audio,
            timer,
            rng,
            participant_number: 0,
            sequence: None,
            state: TrialState::default(),
            lockout: SelectionLockout::new(),
        })
    }

    pub fn set_participant_number(&mut self, participant_number: u32) {
        self.participant_number = participant_number;
    }

    /// Opens the participant's log and builds the trial order shared by all conditions.
    pub fn start_experiment(&mut self) -> StudyResult<()> {
        self.open_experiment()?;
        let sequence = self
            .catalogue
            .build(self.config.instruction_multiplication_number, &mut self.rng)?;
        self.install_sequence(sequence);
        Ok(())
    }

    /// Like `start_experiment`, with a trial order generated elsewhere.
    ///
    /// Every index must name a catalogue entry and the name at each position
    /// must be that entry's name. Stream lengths are checked later, by `advance`.
    pub fn start_experiment_with_sequence(&mut self, sequence: TrialSequence) -> StudyResult<()> {
        self.catalogue.check_sequence(&sequence).inspect_err(|err| {
            error!(%err, "rejected injected trial sequence");
        })?;
        self.open_experiment()?;
        self.install_sequence(sequence);
        Ok(())
    }

    fn open_experiment(&mut self) -> StudyResult<()> {
        self.log.init(self.participant_number)?;
        self.presenter.show_instruction(WAITING_PLACEHOLDER);
        self.log.write_row(&LogRow::marker(LogRow::START_EXPERIMENT))?;
        Ok(())
    }

    fn install_sequence(&mut self, sequence: TrialSequence) {
        info!(
            participant = self.participant_number,
            trials = sequence.len(),
            "experiment started"
        );
        self.sequence = Some(sequence);
    }

    pub fn start_condition_named(&mut self, name: &str) -> StudyResult<()> {
        let condition = name.parse::<Condition>().inspect_err(|err| {
            error!(%err, "cannot start condition");
        })?;
        self.start_condition(condition)
    }

    pub fn start_condition(&mut self, condition: Condition) -> StudyResult<()> {
        let Some(sequence) = self.sequence.as_ref() else {
            return Err(StudyError::ExperimentNotStarted);
        };
        if sequence.is_empty() {
            return Err(StudyError::Configuration("trial sequence is empty".into()));
        }
        if self.state.running {
            warn!(
                from = ?self.state.current_condition,
                to = %condition,
                turn = self.state.turn_number,
                "condition started while another was still running"
            );
            self.abandon_running_condition();
        }

        let instruction = match self.prepare_condition(condition) {
            Ok(instruction) => instruction,
            Err(err) => {
                self.adapters.get_mut(condition).on_end();
                error!(%err, %condition, "condition could not start");
                return Err(err);
            }
        };
        self.state.begin(condition);

        self.presenter.set_condition_selectors_enabled(false);
        self.presenter.set_main_menu_visible(false);
        self.presenter.set_condition_menu_visible(condition, true);
        self.presenter.show_instruction(&instruction);
        self.arm_lockout()?;

        self.log.write_row(&LogRow::marker(condition.start_marker()))?;
        if let Some(sequence) = self.sequence.as_ref() {
            self.log.write_instruction_sequence(sequence)?;
        }
        info!(%condition, %instruction, "condition started");
        Ok(())
    }

    fn prepare_condition(&mut self, condition: Condition) -> StudyResult<String> {
        self.adapters
            .get_mut(condition)
            .on_start(&self.catalogue, &mut self.rng)?;
        self.instruction_for_turn(condition, 0)
    }

    /// Stops the running condition's input without writing an end marker.
    fn abandon_running_condition(&mut self) {
        self.state.freeze();
        self.lockout.cancel();
        if let Some(previous) = self.state.current_condition {
            self.adapters.get_mut(previous).on_end();
        }
    }

    /// Scores an index-based selection against the current target, logs it and
    /// moves on. Returns `None` when no condition is running.
    pub fn select_item(
        &mut self,
        item: &str,
        target_item: &str,
        index: usize,
    ) -> StudyResult<Option<SelectionRecord>> {
        let Some(condition) = self.accepting_condition() else {
            info!(item, index, "selection outside an active condition ignored");
            return Ok(None);
        };

        self.audio.play(POSITIVE_FEEDBACK_CUE);
        let target_index = self.current_target_index()?;
        let record = SelectionRecord {
            selected_item: item.to_string(),
            target_item: target_item.to_string(),
            selected_index: IndexField::At(index),
            target_index: IndexField::At(target_index),
            is_correct: index == target_index,
            condition,
        };
        self.commit(record)
    }

    /// Selects the button at `index` on the running condition's panel.
    pub fn select_button(&mut self, index: usize) -> StudyResult<Option<SelectionRecord>> {
        let Some(condition) = self.accepting_condition() else {
            info!(index, "button press outside an active condition ignored");
            return Ok(None);
        };
        let Some(panel) = self.adapters.buttons(condition) else {
            warn!(%condition, index, "condition has no buttons");
            return Ok(None);
        };
        let item = panel.label_for_button(index)?.to_string();
        let target_item = self.current_instruction()?;
        self.select_item(&item, &target_item, index)
    }

    /// Scores a spoken keyword against the current name, ignoring case.
    /// Surrounding whitespace is significant.
    pub fn select_item_voice(&mut self, item: &str) -> StudyResult<Option<SelectionRecord>> {
        let Some(condition) = self.accepting_condition() else {
            info!(item, "before providing input, please select a condition");
            return Ok(None);
        };

        self.audio.play(POSITIVE_FEEDBACK_CUE);
        let target_item = self.current_sequence()?.name_at(self.state.turn_number)?.to_string();
        let is_correct = item.to_lowercase() == target_item.to_lowercase();
        let record = SelectionRecord {
            selected_item: item.to_string(),
            target_item,
            selected_index: IndexField::NotApplicable,
            target_index: IndexField::NotApplicable,
            is_correct,
            condition,
        };
        self.commit(record)
    }

    fn accepting_condition(&self) -> Option<Condition> {
        self.state
            .current_condition
            .filter(|_| self.state.running)
    }

    fn commit(&mut self, record: SelectionRecord) -> StudyResult<Option<SelectionRecord>> {
        debug!(
            condition = %record.condition,
            item = %record.selected_item,
            target = %record.target_item,
            index = %record.selected_index,
            target_index = %record.target_index,
            is_correct = record.is_correct,
            turn = self.state.turn_number,
            "selection scored"
        );
        self.log.write_row(&LogRow::from(&record))?;
        self.advance()?;
        Ok(Some(record))
    }

    /// Moves to the next trial, or ends the condition when the sequence is exhausted.
    ///
    /// The turn counter is incremented before the stream lengths are compared,
    /// so a length mismatch leaves the counter advanced.
    pub fn advance(&mut self) -> StudyResult<()> {
        let Some(condition) = self.accepting_condition() else {
            return Err(StudyError::NotRunning);
        };
        self.state.turn_number += 1;

        let sequence = self.current_sequence()?;
        sequence.check_consistent().inspect_err(|err| {
            error!(%err, turn = self.state.turn_number, "trial sequence is inconsistent");
        })?;

        if self.state.turn_number < sequence.len() {
            let instruction = self.instruction_for_turn(condition, self.state.turn_number)?;
            self.presenter.show_instruction(&instruction);
            self.arm_lockout()?;
            debug!(turn = self.state.turn_number, %instruction, "next instruction");
            Ok(())
        } else {
            self.end_condition()
        }
    }

    pub fn end_condition(&mut self) -> StudyResult<()> {
        self.state.freeze();
        let condition = self
            .state
            .current_condition
            .ok_or_else(UnknownCondition::none)?;
        self.adapters.get_mut(condition).on_end();

        self.log.write_row(&LogRow::marker(condition.end_marker()))?;
        self.presenter.show_instruction(WAITING_PLACEHOLDER);
        self.go_back_to_main_menu();
        info!(%condition, turns = self.state.turn_number, "condition ended");
        Ok(())
    }

    fn go_back_to_main_menu(&mut self) {
        self.presenter.set_main_menu_visible(true);
        for condition in Condition::ALL {
            self.presenter.set_condition_menu_visible(condition, false);
        }
        self.presenter.set_condition_selectors_enabled(true);
    }

    /// Catalogue index of the trial at the current turn.
    pub fn current_target_index(&self) -> StudyResult<usize> {
        let sequence = self.current_sequence()?;
        if !self.state.running {
            return Err(StudyError::IndexOutOfRange {
                index: self.state.turn_number,
                len: sequence.len(),
            });
        }
        sequence.index_at(self.state.turn_number)
    }

    pub fn current_instruction(&self) -> StudyResult<String> {
        let condition = self.accepting_condition().ok_or(StudyError::NotRunning)?;
        self.instruction_for_turn(condition, self.state.turn_number)
    }

    /// Releases the selection lockout if its pause has elapsed.
    pub fn poll(&mut self) -> StudyResult<bool> {
        let now = self.timer.now();
        self.lockout
            .fire_due(now, self.state.current_condition, &mut self.adapters)
    }

    fn arm_lockout(&mut self) -> StudyResult<()> {
        let pause = self.config.inter_selection_pause()?;
        let now = self.timer.now();
        self.lockout
            .arm(now, pause, self.state.current_condition, &mut self.adapters)?;
        Ok(())
    }

    fn instruction_for_turn(&self, condition: Condition, turn: usize) -> StudyResult<String> {
        let sequence = self.current_sequence()?;
        self.adapters
            .get(condition)
            .instruction_for_trial(sequence, turn)
    }

    fn current_sequence(&self) -> StudyResult<&TrialSequence> {
        self.sequence.as_ref().ok_or(StudyError::ExperimentNotStarted)
    }

    /// A copy of the catalogue names, in catalogue order.
    pub fn instruction_names(&self) -> Vec<String> {
        self.catalogue.names().to_vec()
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn sequence(&self) -> Option<&TrialSequence> {
        self.sequence.as_ref()
    }

    pub fn adapters(&self) -> &ConditionAdapters {
        &self.adapters
    }

    pub fn lockout_pending(&self) -> bool {
        self.lockout.is_pending()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn log_sink(&self) -> &L {
        &self.log
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
