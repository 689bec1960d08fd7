//! End-to-end properties of the roster -> ranking -> formatter pipeline,
//! exercised through the public crate API.

use scholarbot::ranking::{sort_entries, RankingEntry};
use scholarbot::roster::{LoadOutcome, RosterStore};
use scholarbot::format_leaderboard;

fn entry(id: &str, name: &str, score: Option<i64>) -> RankingEntry {
    RankingEntry {
        account_id: id.to_string(),
        display_name: name.to_string(),
        score,
    }
}

#[test]
fn sorted_board_is_one_line_per_entry_non_increasing() {
    let mut entries = vec![
        entry("0xA", "Alice", Some(1200)),
        entry("0xB", "", Some(1500)),
        entry("0xC", "Carol", Some(1200)),
        entry("0xD", "", None),
    ];
    sort_entries(&mut entries);
    let text = format_leaderboard(&entries);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);

    // Non-increasing MMR with the lookup failure last.
    let scores: Vec<Option<i64>> = entries.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![Some(1500), Some(1200), Some(1200), None]);

    // Ties keep the original (roster) order: 0xA before 0xC.
    assert_eq!(
        lines,
        vec![
            "0xB -- 1500 MMR",
            "Alice -- 1200 MMR",
            "Carol -- 1200 MMR",
            "0xD -- timeout MMR",
        ]
    );
}

#[test]
fn spec_scenario_two_scholars() {
    // Roster {"0xA": "Alice", "0xB": ""} with scores 1200 and 1500.
    let mut entries = vec![
        entry("0xA", "Alice", Some(1200)),
        entry("0xB", "", Some(1500)),
    ];
    sort_entries(&mut entries);
    assert_eq!(
        format_leaderboard(&entries),
        "0xB -- 1500 MMR\nAlice -- 1200 MMR\n"
    );
}

#[test]
fn persisted_roster_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = RosterStore::new(Some(path.clone()));
    store.add("0xB", "Bob").unwrap();
    store.add("0xA", "").unwrap();
    store.save().unwrap();

    // load(save(load(save(R)))) is mapping-equal to load(save(R)).
    let (first, outcome) = RosterStore::load(Some(path.clone()));
    assert_eq!(outcome, LoadOutcome::Loaded);
    first.save().unwrap();
    let (second, outcome) = RosterStore::load(Some(path));
    assert_eq!(outcome, LoadOutcome::Loaded);

    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.entries(), store.entries());
}
