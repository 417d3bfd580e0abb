pub mod adapter;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod lockout;
pub mod ports;
pub mod state;

pub use adapter::{
    BaselineAdapter, ButtonAdapter, ButtonLayout, ConditionAdapter, ConditionAdapters, VoiceAdapter,
};
pub use catalogue::{InstructionCatalogue, TrialSequence};
pub use config::StudyConfig;
pub use error::{StudyError, StudyResult};
pub use lockout::SelectionLockout;
pub use ports::{AudioCue, ButtonSurface, LogSink, MemoryLogSink, Presenter, VoiceRecognizer};
pub use state::{Collaborators, TrialStateMachine, POSITIVE_FEEDBACK_CUE, WAITING_PLACEHOLDER};
