//! Shared test utilities and fixtures
//!
//! [`ChallengePeer`] plays the server side of the protocol in-process: it
//! prompts for patterns, remembers what was registered, then quizzes the
//! client with rotated copies and grades each answer.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::{io, mem};

use gridsig_core::{GeneratorSettings, Peer, PatternGenerator, SessionDriver};
use gridsig_types::{Canonicalizer, Grid, Pattern, Rotation, Segment};

pub const FLAG: &str = "TFCCTF{gr1d_r0t4t10ns_4r3_4_gr0up}";

pub fn canonicalizer() -> Canonicalizer {
    Canonicalizer::new(Grid::new().unwrap())
}

pub fn generator(seed: u64) -> PatternGenerator {
    PatternGenerator::new(GeneratorSettings::new(seed, 9, 14, 100_000).unwrap())
}

pub fn driver(peer: &mut ChallengePeer, seed: u64) -> SessionDriver<&mut ChallengePeer> {
    SessionDriver::new(peer, canonicalizer(), generator(seed))
}

/// One phase-2 question: the pattern to send and the identifier the peer
/// considers correct.
#[derive(Debug, Clone)]
struct Question {
    pattern: Pattern,
    expected: i64,
}

#[derive(Debug)]
enum Expect {
    /// Waiting for the count line of the pattern registered under `id`.
    Count { id: i64 },
    Segments { id: i64, left: usize, pattern: Pattern },
    Answer { index: usize },
    Nothing,
}

#[derive(Debug)]
pub struct ChallengePeer {
    ids: Vec<i64>,
    next_prompt: usize,
    registered: Vec<(i64, Pattern)>,
    /// Extra phase-2 questions appended after the rotated registrations.
    extra: Vec<(Pattern, i64)>,
    questions: Vec<Question>,
    outbox: VecDeque<String>,
    expect: Expect,
    correct: usize,
    /// Stop delivering lines once this many have been sent.
    line_budget: Option<usize>,
    delivered: usize,
    answers: Vec<i64>,
}

impl ChallengePeer {
    pub fn new(ids: &[i64]) -> Self {
        let mut peer = Self {
            ids: ids.to_vec(),
            next_prompt: 0,
            registered: Vec::new(),
            extra: Vec::new(),
            questions: Vec::new(),
            outbox: VecDeque::new(),
            expect: Expect::Nothing,
            correct: 0,
            line_budget: None,
            delivered: 0,
            answers: Vec::new(),
        };
        peer.push("Welcome to the rotated grid challenge.");
        peer.push("Register each pattern as a count line followed by segments.");
        peer.prompt_or_switch();
        peer
    }

    /// Also ask about `pattern`, expecting `expected` as the answer.
    pub fn with_extra_question(mut self, pattern: Pattern, expected: i64) -> Self {
        self.extra.push((pattern, expected));
        self
    }

    /// Hang up after `lines` lines have been delivered.
    pub fn hang_up_after(mut self, lines: usize) -> Self {
        self.line_budget = Some(lines);
        self
    }

    pub fn registered(&self) -> &[(i64, Pattern)] {
        &self.registered
    }

    pub fn answers(&self) -> &[i64] {
        &self.answers
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    fn push(&mut self, line: impl Into<String>) {
        self.outbox.push_back(line.into());
    }

    fn prompt_or_switch(&mut self) {
        if let Some(&id) = self.ids.get(self.next_prompt) {
            self.next_prompt += 1;
            self.push(format!("N_{}: {id}", self.next_prompt));
            self.expect = Expect::Count { id };
        } else {
            self.push("=== Phase 2 ===");
            self.build_questions();
            self.ask(0);
        }
    }

    fn build_questions(&mut self) {
        // Reverse order with a different rotation for each.
        self.questions = self
            .registered
            .iter()
            .rev()
            .enumerate()
            .map(|(i, (id, pattern))| Question {
                pattern: pattern.rotated(Rotation::from_quarter_turns(i as i64 + 1)),
                expected: *id,
            })
            .collect();
        self.questions
            .extend(self.extra.iter().map(|(pattern, expected)| Question {
                pattern: pattern.clone(),
                expected: *expected,
            }));
    }

    fn ask(&mut self, index: usize) {
        let Some(question) = self.questions.get(index).cloned() else {
            self.finish();
            return;
        };
        self.push(format!("MutatedPattern: {}/{}", index + 1, self.questions.len()));
        self.push(format!("m = {}", question.pattern.len()));
        for segment in &question.pattern {
            let (a, b) = (segment.start(), segment.end());
            // Send endpoints reversed to check that order does not matter.
            self.push(format!("{} {} {} {}", b.x(), b.y(), a.x(), a.y()));
        }
        self.expect = Expect::Answer { index };
    }

    fn finish(&mut self) {
        self.expect = Expect::Nothing;
        if self.correct == self.questions.len() {
            self.push("All correct! Here is your flag:");
            self.push(FLAG);
        } else {
            self.push(format!(
                "You solved {}/{}. No flag for you.",
                self.correct,
                self.questions.len()
            ));
        }
    }

    fn parse_int(line: &str) -> io::Result<i64> {
        line.trim()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{line:?}: {e}")))
    }
}

impl Peer for ChallengePeer {
    fn recv_line(&mut self) -> io::Result<Option<String>> {
        if self.line_budget.is_some_and(|budget| self.delivered >= budget) {
            return Ok(None);
        }
        let line = self.outbox.pop_front();
        if line.is_some() {
            self.delivered += 1;
        }
        Ok(line)
    }

    fn send_line(&mut self, line: &str) -> io::Result<()> {
        match mem::replace(&mut self.expect, Expect::Nothing) {
            Expect::Count { id } => {
                let left = usize::try_from(Self::parse_int(line)?)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                self.expect = Expect::Segments {
                    id,
                    left,
                    pattern: Pattern::new(),
                };
                if left == 0 {
                    self.finish_registration();
                }
            }
            Expect::Segments {
                id,
                left,
                mut pattern,
            } => {
                let coords: Vec<i64> = line
                    .split_whitespace()
                    .map(Self::parse_int)
                    .collect::<io::Result<_>>()?;
                let [x1, y1, x2, y2] = coords[..] else {
                    return Err(io::Error::new(io::ErrorKind::InvalidData, line.to_string()));
                };
                let segment = Segment::from_coords(x1, y1, x2, y2)
                    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, line.to_string()))?;
                pattern.insert(segment);
                self.expect = Expect::Segments {
                    id,
                    left: left - 1,
                    pattern,
                };
                if left == 1 {
                    self.finish_registration();
                }
            }
            Expect::Answer { index } => {
                let answer = Self::parse_int(line)?;
                self.answers.push(answer);
                if answer == self.questions[index].expected {
                    self.correct += 1;
                    self.push("Correct!");
                } else {
                    self.push(format!(
                        "Wrong! Expected {}, got {answer}",
                        self.questions[index].expected
                    ));
                }
                self.ask(index + 1);
            }
            Expect::Nothing => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unexpected line {line:?}"),
                ));
            }
        }
        Ok(())
    }
}

impl ChallengePeer {
    fn finish_registration(&mut self) {
        if let Expect::Segments { id, pattern, .. } =
            mem::replace(&mut self.expect, Expect::Nothing)
        {
            self.registered.push((id, pattern));
            self.push(format!("Stored pattern #{id}."));
            self.prompt_or_switch();
        }
    }
}
