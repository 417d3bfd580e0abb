use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use uxstudy_core::LogRow;
use uxstudy_experiment::{LogSink, TrialSequence};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Entry<'a> {
    Row {
        seq: u64,
        #[serde(flatten)]
        row: &'a LogRow,
    },
    Sequence {
        seq: u64,
        indices: &'a [usize],
        names: &'a [String],
    },
}

/// Writes one JSON object per line to `<dir>/participant_<n>.jsonl`.
pub struct JsonlLogSink {
    dir: PathBuf,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    seq: u64,
}

impl JsonlLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            path: None,
            writer: None,
            seq: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn write_entry(&mut self, entry: &Entry<'_>) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "log sink used before init")
        })?;
        serde_json::to_writer(&mut *writer, entry)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

impl LogSink for JsonlLogSink {
    fn init(&mut self, participant_number: u32) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("participant_{participant_number}.jsonl"));
        let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
        self.writer = Some(BufWriter::new(file));
        self.path = Some(path);
        Ok(())
    }

    fn write_row(&mut self, row: &LogRow) -> io::Result<()> {
        let seq = self.next_seq();
        self.write_entry(&Entry::Row { seq, row })
    }

    fn write_instruction_sequence(&mut self, sequence: &TrialSequence) -> io::Result<()> {
        let seq = self.next_seq();
        self.write_entry(&Entry::Sequence {
            seq,
            indices: sequence.indices(),
            names: sequence.names(),
        })
    }
}
