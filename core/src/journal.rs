//! Optional on-disk record of a session.
//!
//! When open, the journal keeps three files side by side, all suffixed with
//! the session timestamp:
//!
//! - `transcript_<ts>.txt`: every line, `< ` for inbound and `> ` for outbound
//! - `phase1_map_<ts>.csv`: one row per registration
//! - `phase2_answers_<ts>.csv`: one row per answered query
//!
//! Write failures are logged and otherwise ignored; the journal never affects
//! the protocol exchange.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gridsig_types::{PatternId, Signature};

const PHASE1_HEADER: &str = "canon_bits_decimal,N";
const PHASE2_HEADER: &str = "query_idx,m,canon_bits_decimal,answered_N,server_reply";

/// One answered mutated-pattern query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// 1-based position of the query in the session.
    pub query: usize,
    /// Segment count announced by the peer.
    pub size: usize,
    pub signature: Signature,
    pub answer: PatternId,
    /// The peer's verdict line, verbatim.
    pub verdict: String,
}

struct Sink {
    path: PathBuf,
    file: File,
}

impl Sink {
    fn create(path: PathBuf, header: Option<&str>) -> io::Result<Self> {
        let mut file = File::create(&path)?;
        if let Some(header) = header {
            writeln!(file, "{header}")?;
        }
        Ok(Self { path, file })
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.file, "{line}") {
            tracing::warn!(path = %self.path.display(), "Journal write failed: {e}");
        }
    }
}

#[derive(Default)]
pub struct Journal {
    transcript: Option<Sink>,
    registrations: Option<Sink>,
    answers: Option<Sink>,
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Journal {
    /// A journal that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open journal files in `dir` stamped with the current local time.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::open_with_stamp(dir, &stamp)
    }

    /// Open journal files in `dir` with an explicit stamp. Creates `dir` if
    /// needed.
    pub fn open_with_stamp(dir: &Path, stamp: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let journal = Self {
            transcript: Some(Sink::create(
                dir.join(format!("transcript_{stamp}.txt")),
                None,
            )?),
            registrations: Some(Sink::create(
                dir.join(format!("phase1_map_{stamp}.csv")),
                Some(PHASE1_HEADER),
            )?),
            answers: Some(Sink::create(
                dir.join(format!("phase2_answers_{stamp}.csv")),
                Some(PHASE2_HEADER),
            )?),
        };
        tracing::info!(dir = %dir.display(), stamp, "Journal opened");
        Ok(journal)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.transcript.is_some()
    }

    pub fn inbound(&mut self, line: &str) {
        if let Some(sink) = &mut self.transcript {
            sink.write_line(&format!("< {line}"));
        }
    }

    pub fn outbound(&mut self, line: &str) {
        if let Some(sink) = &mut self.transcript {
            sink.write_line(&format!("> {line}"));
        }
    }

    pub fn registration(&mut self, signature: Signature, id: PatternId) {
        if let Some(sink) = &mut self.registrations {
            sink.write_line(&format!("{signature},{id}"));
        }
    }

    pub fn answer(&mut self, record: &AnswerRecord) {
        if let Some(sink) = &mut self.answers {
            sink.write_line(&format!(
                "{},{},{},{},{}",
                record.query,
                record.size,
                record.signature,
                record.answer,
                csv_field(&record.verdict)
            ));
        }
    }
}

/// Quote a free-text CSV field when it contains a delimiter, quote, or line
/// break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
