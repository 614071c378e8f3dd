//! The two-phase protocol state machine.
//!
//! ```text
//! AwaitBanner -> Registration -> Verification -> Done(outcome)
//!                     |               |
//!                     +--- EOF -------+---------> Done(Disconnected)
//! ```
//!
//! During registration every prompt gets a freshly generated pattern whose
//! rotation class has not been used, and the class is bound to the prompt's
//! identifier. During verification every mutated pattern is canonicalized and
//! answered with the bound identifier (or `0`). The driver reads only what
//! the protocol calls for next and never retries an exchange.

use std::fmt;

use gridsig_types::{Canonicalizer, Pattern, PatternId, Signature};

use crate::errors::SessionError;
use crate::generator::PatternGenerator;
use crate::journal::{AnswerRecord, Journal};
use crate::peer::Peer;
use crate::protocol::{
    RegistrationLine, VerificationLine, classify_registration, classify_verification,
    encode_pattern, parse_count, parse_segment,
};
use crate::registry::PatternRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Banner,
    Registration,
    Verification,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Banner => "banner",
            Phase::Registration => "registration",
            Phase::Verification => "verification",
        };
        f.write_str(name)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The peer accepted every answer and sent the reward payload.
    Success { flag: String },
    /// The peer reported a partial score; the line is kept verbatim.
    Partial { summary: String },
    /// The stream ended before a terminal marker.
    Disconnected { phase: Phase },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Distinct rotation classes in the registry.
    pub registered: usize,
    /// Registrations that replaced the identifier of a known class.
    pub rebound: usize,
    /// Prompts whose last integer was missing or out of range.
    pub skipped_prompts: usize,
    pub queries: usize,
    /// Queries whose signature was registered.
    pub hits: usize,
    /// Queries answered with the not-found sentinel.
    pub misses: usize,
    /// Query segment lines that did not parse as a valid segment.
    pub skipped_segments: usize,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "registered {} patterns, answered {} queries ({} known, {} unknown)",
            self.registered, self.queries, self.hits, self.misses
        )
    }
}

enum SessionState {
    AwaitBanner,
    Registration,
    Verification,
    Done(SessionOutcome),
}

/// Owns the registry and used-signature set for one session against one peer.
pub struct SessionDriver<P> {
    peer: P,
    canon: Canonicalizer,
    registry: PatternRegistry,
    generator: PatternGenerator,
    journal: Journal,
    stats: SessionStats,
}

impl<P: Peer> SessionDriver<P> {
    pub fn new(peer: P, canon: Canonicalizer, generator: PatternGenerator) -> Self {
        Self {
            peer,
            canon,
            registry: PatternRegistry::new(),
            generator,
            journal: Journal::disabled(),
            stats: SessionStats::default(),
        }
    }

    #[must_use]
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canon
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn into_peer(self) -> P {
        self.peer
    }

    /// Bind `pattern`'s rotation class to `id` and keep the generator from
    /// handing that class out again.
    pub fn register_pattern(&mut self, pattern: &Pattern, id: PatternId) -> Signature {
        let signature = self.canon.signature(pattern);
        self.generator.mark_used(signature);
        self.bind(signature, id);
        signature
    }

    /// The identifier registered for `pattern`'s rotation class, or
    /// [`PatternId::NOT_FOUND`].
    pub fn answer(&self, pattern: &Pattern) -> (Signature, PatternId) {
        let signature = self.canon.signature(pattern);
        (signature, self.registry.lookup(signature))
    }

    /// Drive the protocol until a terminal state.
    ///
    /// End-of-stream is not an error: it yields
    /// [`SessionOutcome::Disconnected`] for the phase it interrupted.
    pub fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        let mut state = SessionState::AwaitBanner;
        loop {
            state = match state {
                SessionState::AwaitBanner => self.await_banner()?,
                SessionState::Registration => self.registration_turn()?,
                SessionState::Verification => self.verification_turn()?,
                SessionState::Done(outcome) => {
                    tracing::info!(outcome = ?outcome, stats = %self.stats, "Session finished");
                    return Ok(outcome);
                }
            };
        }
    }

    fn await_banner(&mut self) -> Result<SessionState, SessionError> {
        if self.recv()?.is_none() {
            return Ok(disconnected(Phase::Banner));
        }
        tracing::info!("Registration phase started");
        Ok(SessionState::Registration)
    }

    fn registration_turn(&mut self) -> Result<SessionState, SessionError> {
        let Some(line) = self.recv()? else {
            return Ok(disconnected(Phase::Registration));
        };

        match classify_registration(&line) {
            RegistrationLine::PhaseBoundary => {
                tracing::info!(registered = self.registry.len(), "Verification phase started");
                Ok(SessionState::Verification)
            }
            RegistrationLine::Prompt(id) => self.register_fresh(id),
            RegistrationLine::PromptWithoutId => {
                tracing::warn!(line = %line, "Registration prompt without an identifier; skipped");
                self.stats.skipped_prompts += 1;
                Ok(SessionState::Registration)
            }
            RegistrationLine::Other => Ok(SessionState::Registration),
        }
    }

    fn register_fresh(&mut self, id: PatternId) -> Result<SessionState, SessionError> {
        let (pattern, signature) = self.generator.next_unique(&self.canon)?;
        self.bind(signature, id);
        tracing::debug!(%id, %signature, size = pattern.len(), "Registered pattern");

        for line in encode_pattern(&pattern) {
            self.send(&line)?;
        }

        // Acknowledgement; content is not interpreted.
        if self.recv()?.is_none() {
            return Ok(disconnected(Phase::Registration));
        }
        Ok(SessionState::Registration)
    }

    fn bind(&mut self, signature: Signature, id: PatternId) {
        match self.registry.register(signature, id) {
            None => self.stats.registered += 1,
            Some(_) => self.stats.rebound += 1,
        }
        self.journal.registration(signature, id);
    }

    fn verification_turn(&mut self) -> Result<SessionState, SessionError> {
        let Some(line) = self.recv()? else {
            return Ok(disconnected(Phase::Verification));
        };

        match classify_verification(&line) {
            VerificationLine::Query => self.answer_query(),
            VerificationLine::Success => match self.recv()? {
                Some(flag) => Ok(SessionState::Done(SessionOutcome::Success { flag })),
                None => Ok(disconnected(Phase::Verification)),
            },
            VerificationLine::Partial => {
                Ok(SessionState::Done(SessionOutcome::Partial { summary: line }))
            }
            VerificationLine::Other => Ok(SessionState::Verification),
        }
    }

    fn answer_query(&mut self) -> Result<SessionState, SessionError> {
        self.stats.queries += 1;
        let query = self.stats.queries;

        let Some(count_line) = self.recv()? else {
            return Ok(disconnected(Phase::Verification));
        };
        let size = parse_count(&count_line).ok_or_else(|| SessionError::MalformedCount {
            query,
            line: count_line.clone(),
        })?;

        let mut pattern = Pattern::new();
        for _ in 0..size {
            let Some(line) = self.recv()? else {
                return Ok(disconnected(Phase::Verification));
            };
            match parse_segment(&line) {
                Ok(segment) => {
                    pattern.insert(segment);
                }
                Err(err) => {
                    tracing::warn!(query, line = %line, error = ?err, "Skipping unparsable segment line");
                    self.stats.skipped_segments += 1;
                }
            }
        }

        let (signature, answer) = self.answer(&pattern);
        if answer.is_not_found() {
            self.stats.misses += 1;
            tracing::warn!(query, %signature, "Signature was never registered; answering 0");
        } else {
            self.stats.hits += 1;
        }
        self.send(&answer.to_string())?;

        let verdict = self.recv()?;
        tracing::debug!(query, size, %signature, %answer, verdict = ?verdict, "Answered query");
        self.journal.answer(&AnswerRecord {
            query,
            size,
            signature,
            answer,
            verdict: verdict.clone().unwrap_or_default(),
        });

        match verdict {
            Some(_) => Ok(SessionState::Verification),
            None => Ok(disconnected(Phase::Verification)),
        }
    }

    fn recv(&mut self) -> Result<Option<String>, SessionError> {
        let line = self.peer.recv_line()?;
        match &line {
            Some(line) => {
                tracing::trace!(line = %line, "<");
                self.journal.inbound(line);
            }
            None => tracing::debug!("Peer closed the stream"),
        }
        Ok(line)
    }

    fn send(&mut self, line: &str) -> Result<(), SessionError> {
        tracing::trace!(line, ">");
        self.journal.outbound(line);
        self.peer.send_line(line)?;
        Ok(())
    }
}

fn disconnected(phase: Phase) -> SessionState {
    SessionState::Done(SessionOutcome::Disconnected { phase })
}
