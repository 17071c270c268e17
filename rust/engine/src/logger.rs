use serde::{Deserialize, Serialize};

use crate::board::ContainerId;
use crate::controller::GameController;
use crate::events::SessionSeeds;
use crate::stats::Outcome;
use crate::values::Money;

/// Complete record of one finished session.
/// Serialized to JSONL format for session history storage and statistics.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier for this session (format: YYYYMMDD-NNNNNN)
    pub session_id: String,
    /// Seeds for shuffle and jitter (enables deterministic replay)
    pub seeds: SessionSeeds,
    /// Container the player picked first
    pub held_id: Option<ContainerId>,
    /// Containers opened, in order
    pub eliminated: Vec<ContainerId>,
    /// Every offer shown, in round order
    pub offers: Vec<Money>,
    /// How the session ended; `None` if abandoned
    pub outcome: Option<Outcome>,
    /// Timestamp when the session was played (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Additional metadata (extensible JSON object)
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl SessionRecord {
    /// Captures the current session of `game` under `session_id`.
    pub fn from_controller(session_id: String, game: &GameController) -> Self {
        Self {
            session_id,
            seeds: game.seeds(),
            held_id: game.initial_pick(),
            eliminated: game.eliminated_order().to_vec(),
            offers: game.offer_history().to_vec(),
            outcome: game.outcome().cloned(),
            ts: None,
            meta: None,
        }
    }
}

pub fn format_session_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct SessionLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl SessionLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Appends to an existing file, continuing the id sequence after `seq`.
    pub fn append<P: AsRef<Path>>(path: P, seq: u32) -> std::io::Result<Self> {
        let f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq,
        })
    }

    /// Logger that only hands out ids; nothing is written.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_session_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &SessionRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        tracing::debug!(session_id = %rec.session_id, "session record written");
        Ok(())
    }
}
