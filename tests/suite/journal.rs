//! Journal files written alongside a full session.

use std::fs;

use gridsig_core::{Journal, SessionOutcome};

use crate::common::{ChallengePeer, driver};

#[test]
fn session_journal_records_every_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let journal = Journal::open_with_stamp(dir.path(), "20261019_120000").unwrap();
    let mut peer = ChallengePeer::new(&[11, 22, 33]);

    let outcome = driver(&mut peer, 9).with_journal(journal).run().unwrap();
    assert!(matches!(outcome, SessionOutcome::Success { .. }));

    let phase1 = fs::read_to_string(dir.path().join("phase1_map_20261019_120000.csv")).unwrap();
    let ids: Vec<&str> = phase1
        .lines()
        .skip(1)
        .filter_map(|row| row.split(',').nth(1))
        .collect();
    assert_eq!(ids, ["11", "22", "33"]);

    let phase2 =
        fs::read_to_string(dir.path().join("phase2_answers_20261019_120000.csv")).unwrap();
    let rows: Vec<&str> = phase2.lines().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("1,"));
    assert!(rows.iter().all(|row| row.ends_with(",Correct!")));

    let transcript =
        fs::read_to_string(dir.path().join("transcript_20261019_120000.txt")).unwrap();
    assert!(transcript.starts_with("< Welcome"));
    assert!(transcript.contains("> 33\n"));
    assert!(transcript.ends_with("< All correct! Here is your flag:\n< TFCCTF{gr1d_r0t4t10ns_4r3_4_gr0up}\n"));
}
