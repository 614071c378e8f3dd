//! Full sessions against the in-process challenge peer.

use std::collections::HashSet;

use gridsig_core::{Phase, SessionOutcome};
use gridsig_types::{Pattern, Segment};

use crate::common::{ChallengePeer, FLAG, canonicalizer, driver};

fn single_segment() -> Pattern {
    [Segment::from_coords(0, 0, 1, 0).unwrap()]
        .into_iter()
        .collect()
}

#[test]
fn rotated_queries_are_all_answered() {
    let ids = [17, 4, 99, 23, 8];
    let mut peer = ChallengePeer::new(&ids);

    let (outcome, stats) = {
        let mut driver = driver(&mut peer, 0xC0FFEE);
        (driver.run().unwrap(), driver.stats())
    };

    assert_eq!(
        outcome,
        SessionOutcome::Success {
            flag: FLAG.to_string()
        }
    );
    assert_eq!(stats.registered, 5);
    assert_eq!(stats.queries, 5);
    assert_eq!(stats.hits, 5);
    assert_eq!(stats.misses, 0);
    assert_eq!(peer.correct(), 5);
    // Questions arrive in reverse registration order.
    assert_eq!(peer.answers(), &[8, 23, 99, 4, 17]);
}

#[test]
fn registered_patterns_are_rotation_distinct() {
    let ids: Vec<i64> = (1..=40).collect();
    let mut peer = ChallengePeer::new(&ids);
    driver(&mut peer, 7).run().unwrap();

    let canon = canonicalizer();
    let signatures: HashSet<_> = peer
        .registered()
        .iter()
        .map(|(_, pattern)| canon.signature(pattern))
        .collect();
    assert_eq!(signatures.len(), 40);
    assert!(
        peer.registered()
            .iter()
            .all(|(_, pattern)| (9..=14).contains(&pattern.len()))
    );
}

#[test]
fn same_seed_registers_same_patterns() {
    let run = |seed| {
        let mut peer = ChallengePeer::new(&[1, 2, 3]);
        driver(&mut peer, seed).run().unwrap();
        peer.registered().to_vec()
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn unknown_pattern_is_answered_with_zero() {
    let mut peer = ChallengePeer::new(&[10, 20]).with_extra_question(single_segment(), 0);

    let (outcome, stats) = {
        let mut driver = driver(&mut peer, 1);
        (driver.run().unwrap(), driver.stats())
    };

    assert!(matches!(outcome, SessionOutcome::Success { .. }));
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(peer.answers().last(), Some(&0));
}

#[test]
fn wrong_answer_ends_in_partial() {
    let mut peer = ChallengePeer::new(&[10, 20, 30]).with_extra_question(single_segment(), 7);

    let outcome = driver(&mut peer, 1).run().unwrap();

    let SessionOutcome::Partial { summary } = outcome else {
        panic!("expected a partial outcome, got {outcome:?}");
    };
    assert!(summary.starts_with("You solved 3/4"));
    assert_eq!(peer.correct(), 3);
}

#[test]
fn repeated_identifier_is_still_answered() {
    let mut peer = ChallengePeer::new(&[5, 5, 6]);

    let outcome = driver(&mut peer, 3).run().unwrap();

    assert!(matches!(outcome, SessionOutcome::Success { .. }));
    assert_eq!(peer.answers(), &[6, 5, 5]);
}

#[test]
fn hang_up_during_registration() {
    // Two banner lines, the first prompt, and its acknowledgement.
    let mut peer = ChallengePeer::new(&[1, 2]).hang_up_after(4);

    let outcome = driver(&mut peer, 0).run().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Disconnected {
            phase: Phase::Registration
        }
    );
    assert_eq!(peer.registered().len(), 1);
}

#[test]
fn hang_up_during_verification() {
    // Banner (2) + two registrations (4) + phase marker + first query marker.
    let mut peer = ChallengePeer::new(&[1, 2]).hang_up_after(8);

    let outcome = driver(&mut peer, 0).run().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Disconnected {
            phase: Phase::Verification
        }
    );
}

#[test]
fn silent_peer_disconnects_before_banner() {
    let mut peer = ChallengePeer::new(&[1]).hang_up_after(0);

    let outcome = driver(&mut peer, 0).run().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Disconnected {
            phase: Phase::Banner
        }
    );
}

#[test]
fn empty_registration_goes_straight_to_flag() {
    let mut peer = ChallengePeer::new(&[]);

    let outcome = driver(&mut peer, 0).run().unwrap();

    assert_eq!(
        outcome,
        SessionOutcome::Success {
            flag: FLAG.to_string()
        }
    );
}
