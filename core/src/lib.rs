//! Session logic for gridsig.
//!
//! This crate drives the two-phase challenge against a peer:
//!
//! - **`registry`**: canonical signature to peer-assigned identifier
//! - **`generator`**: seeded sampler of patterns with unused signatures
//! - **`protocol`**: classification and parsing of inbound lines
//! - **`peer`**: line framing over any reader/writer pair
//! - **`session`**: the protocol state machine
//! - **`journal`**: optional transcript and CSV records
//! - **`flag`**: persistence of the reward payload

pub mod errors;
pub mod flag;
pub mod generator;
pub mod journal;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod session;

pub use errors::{SessionError, SettingsError};
pub use flag::FlagStore;
pub use generator::{GeneratorSettings, PatternGenerator};
pub use journal::{AnswerRecord, Journal};
pub use peer::{LinePeer, LineReader, LineWriter, Peer};
pub use registry::PatternRegistry;
pub use session::{Phase, SessionDriver, SessionOutcome, SessionStats};
