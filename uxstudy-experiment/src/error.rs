use thiserror::Error;
use uxstudy_core::UnknownCondition;

#[derive(Debug, Error)]
pub enum StudyError {
    #[error("invalid study configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    UnknownCondition(#[from] UnknownCondition),
    #[error("trial index {index} is out of range for a sequence of {len} trials")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(
        "index-based and name-based instructions differ in length (indices={indices}, names={names})"
    )]
    SequenceLengthMismatch { indices: usize, names: usize },
    #[error("the experiment has not been started")]
    ExperimentNotStarted,
    #[error("no condition is running")]
    NotRunning,
    #[error("log sink failed: {0}")]
    Sink(#[from] std::io::Error),
}

pub type StudyResult<T> = Result<T, StudyError>;
