use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use uxstudy_core::Condition;
use uxstudy_experiment::{
    BaselineAdapter, ButtonAdapter, ButtonLayout, Collaborators, ConditionAdapters, StudyConfig,
    StudyError, StudyResult, TrialSequence, TrialStateMachine, VoiceAdapter,
};
use uxstudy_timing::{HighPrecisionTimer, Timer};

use crate::console::{ConsoleAudio, ConsolePanel, ConsolePresenter, ConsoleRecognizer};
use crate::session::{Command, HELP};
use crate::sink::JsonlLogSink;

const TICK: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Console driver for the in-vehicle interaction study"
)]
pub struct Cli {
    /// Participant number written to the log file name
    #[arg(long)]
    pub participant: u32,

    /// Study configuration (JSON); defaults are used for missing fields
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the participant's JSON-lines log
    #[arg(long, default_value = "logs")]
    pub out: PathBuf,

    /// Seed for the trial order and button layouts; overrides the config
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pre-generated trial order (JSON with `indices` and `names`)
    #[arg(long)]
    pub sequence: Option<PathBuf>,
}

type Machine =
    TrialStateMachine<ConsolePresenter, JsonlLogSink, ConsoleAudio, HighPrecisionTimer, StdRng>;

enum Flow {
    Continue,
    Quit,
}

pub struct App {
    machine: Machine,
    timer: HighPrecisionTimer,
    touchscreen: ConsolePanel,
    controller: ConsolePanel,
    sequence: Option<TrialSequence>,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => StudyConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => StudyConfig::default(),
        };
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }

        let sequence = match &cli.sequence {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let sequence: TrialSequence = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Some(sequence)
            }
            None => None,
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let layout = if config.shuffle_button_layout {
            ButtonLayout::Shuffled
        } else {
            ButtonLayout::CatalogueOrder
        };

        let touchscreen = ConsolePanel::new("touchscreen");
        let controller = ConsolePanel::new("controller");
        let adapters = ConditionAdapters {
            voice: VoiceAdapter::new(Box::new(ConsoleRecognizer)),
            touchscreen: ButtonAdapter::new(
                Condition::Touchscreen,
                Box::new(touchscreen.clone()),
                layout,
            ),
            controller: ButtonAdapter::new(
                Condition::Controller,
                Box::new(controller.clone()),
                layout,
            ),
            baseline: BaselineAdapter,
        };
        let collaborators = Collaborators {
            presenter: ConsolePresenter::new(),
            log: JsonlLogSink::new(&cli.out),
            audio: ConsoleAudio,
        };

        let timer = HighPrecisionTimer::new();
        let mut machine =
            TrialStateMachine::new(config, adapters, collaborators, timer.clone(), rng)?;
        machine.set_participant_number(cli.participant);

        Ok(Self {
            machine,
            timer,
            touchscreen,
            controller,
            sequence,
        })
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== INTERACTION STUDY ===");
        println!("Platform: {}", std::env::consts::OS);
        match self.sequence.take() {
            Some(sequence) => self.machine.start_experiment_with_sequence(sequence)?,
            None => self.machine.start_experiment()?,
        }
        println!("{HELP}");

        let lines = spawn_stdin_reader();
        loop {
            self.timer.sleep(TICK);
            if let Err(err) = self.machine.poll() {
                warn!(%err, "selection lockout could not release input");
            }

            let line = match lines.try_recv() {
                Ok(line) => line.context("reading console input")?,
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Disconnected) => break,
            };
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if let Flow::Quit = self.dispatch(command)? {
                break;
            }
        }

        if self.machine.state().running {
            self.machine.end_condition()?;
        }
        println!("\nSession closed. Thank you!");
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        let outcome = match command {
            Command::Start(name) => {
                if self.machine.presenter().selectors_enabled() {
                    self.machine.start_condition_named(&name)
                } else {
                    println!("end the running condition before starting another");
                    Ok(())
                }
            }
            Command::Tap(index) => self.tap(index),
            Command::Pick(index) => self.pick(index),
            Command::Say(word) => self.machine.select_item_voice(&word).map(drop),
            Command::End => {
                if self.machine.state().running {
                    self.machine.end_condition()
                } else {
                    println!("no condition is running");
                    Ok(())
                }
            }
            Command::Status => {
                self.print_status();
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        match outcome {
            Ok(()) => Ok(Flow::Continue),
            Err(err @ StudyError::SequenceLengthMismatch { .. }) => {
                error!(%err, "aborting session");
                Err(err.into())
            }
            Err(err) => {
                println!("{err}");
                Ok(Flow::Continue)
            }
        }
    }

    fn tap(&mut self, index: usize) -> StudyResult<()> {
        let panel = match self.machine.state().current_condition {
            Some(Condition::Touchscreen) => &self.touchscreen,
            Some(Condition::Controller) => &self.controller,
            _ => {
                println!("no button panel is active");
                return Ok(());
            }
        };
        if !panel.is_interactable() {
            info!(index, "press dropped during selection lockout");
            return Ok(());
        }
        self.machine.select_button(index).map(drop)
    }

    fn pick(&mut self, index: usize) -> StudyResult<()> {
        let state = self.machine.state();
        if !state.running || state.current_condition != Some(Condition::Baseline) {
            println!("`pick` is only available in the baseline condition");
            return Ok(());
        }
        if self.machine.lockout_pending() {
            info!(index, "pick dropped during selection lockout");
            return Ok(());
        }
        let names = self.machine.instruction_names();
        let Some(item) = names.get(index) else {
            println!("no catalogue item {index}");
            return Ok(());
        };
        let target = self.machine.current_instruction()?;
        self.machine.select_item(item, &target, index).map(drop)
    }

    fn print_status(&self) {
        let state = self.machine.state();
        let total = self.machine.sequence().map_or(0, |s| s.len());
        match state.current_condition.filter(|_| state.running) {
            Some(condition) => {
                println!("{condition}: trial {} of {total}", state.turn_number + 1);
                let panel = match condition {
                    Condition::Touchscreen => Some(&self.touchscreen),
                    Condition::Controller => Some(&self.controller),
                    Condition::Voice | Condition::Baseline => None,
                };
                if let Some(panel) = panel {
                    println!("buttons: {}", panel.labels().join(" | "));
                }
            }
            None => println!("idle ({total} trials per condition)"),
        }
    }
}

/// Reads console lines on a helper thread so the event loop keeps ticking
/// the lockout while waiting for input.
fn spawn_stdin_reader() -> Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
