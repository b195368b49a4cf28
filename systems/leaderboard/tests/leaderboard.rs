use chrono::{DateTime, TimeZone, Utc};
use serpents_core::{HighScoreEntry, HighScoreRecord, Mode, PlayerName};
use serpents_system_leaderboard::{HighScoreTable, MAX_ENTRIES};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

fn entry(name: &str, score: u32, seconds: i64) -> HighScoreEntry {
    HighScoreEntry::new(PlayerName::sanitize(name), score, at(seconds))
}

fn full_table(mode: Mode) -> HighScoreTable {
    let mut table = HighScoreTable::new();
    for index in 0..MAX_ENTRIES {
        let score = 100 - 10 * index as u32;
        let _ = table.insert(mode, entry("AAA", score, index as i64));
    }
    table
}

#[test]
fn entries_are_ordered_by_score_then_timestamp() {
    let mut table = HighScoreTable::new();

    assert_eq!(table.insert(Mode::Classic, entry("BBB", 50, 10)), Some(0));
    assert_eq!(table.insert(Mode::Classic, entry("CCC", 70, 20)), Some(0));
    assert_eq!(table.insert(Mode::Classic, entry("DDD", 50, 5)), Some(1));

    let names: Vec<&str> = table
        .entries(Mode::Classic)
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, vec!["CCC", "DDD", "BBB"]);
    assert!(table.entries(Mode::Boxed).is_empty(), "modes are independent");
}

#[test]
fn eleventh_entry_evicts_the_lowest() {
    let mut table = full_table(Mode::Maze);
    let lowest = table.entries(Mode::Maze)[MAX_ENTRIES - 1].clone();

    let rank = table.insert(Mode::Maze, entry("NEW", 55, 100));

    assert_eq!(rank, Some(5));
    let entries = table.entries(Mode::Maze);
    assert_eq!(entries.len(), MAX_ENTRIES);
    assert!(!entries.contains(&lowest), "lowest entry should have been evicted");
    assert_eq!(entries[5].name.as_str(), "NEW");
}

#[test]
fn equal_score_with_earlier_timestamp_ranks_ahead_of_the_tenth() {
    let mut table = full_table(Mode::Boxed);
    let tenth = table.entries(Mode::Boxed)[MAX_ENTRIES - 1].clone();

    let rank = table.insert(Mode::Boxed, entry("EAR", tenth.score, -50));

    assert_eq!(rank, Some(MAX_ENTRIES - 1));
    assert_eq!(table.entries(Mode::Boxed)[MAX_ENTRIES - 1].name.as_str(), "EAR");
    assert!(!table.entries(Mode::Boxed).contains(&tenth));
}

#[test]
fn equal_score_with_later_timestamp_is_dropped_from_a_full_list() {
    let mut table = full_table(Mode::TimeAttack);
    let before = table.clone();
    let tenth_score = table.entries(Mode::TimeAttack)[MAX_ENTRIES - 1].score;

    assert_eq!(
        table.insert(Mode::TimeAttack, entry("LAT", tenth_score, 500)),
        None
    );
    assert_eq!(table, before);
}

#[test]
fn qualification_mirrors_insertion_with_a_fresh_timestamp() {
    let table = full_table(Mode::Classic);
    let tenth_score = table.entries(Mode::Classic)[MAX_ENTRIES - 1].score;

    assert!(!table.qualifies(Mode::Classic, tenth_score));
    assert!(table.qualifies(Mode::Classic, tenth_score + 1));
    assert!(table.qualifies(Mode::Boxed, 0), "empty lists accept anything");
}

#[test]
fn records_are_normalized_on_load() {
    let mut record = HighScoreRecord::default();
    record.classic = (0..14).map(|index| entry("REC", index, index as i64)).collect();

    let table = HighScoreTable::from_record(record);
    let scores: Vec<u32> = table
        .entries(Mode::Classic)
        .iter()
        .map(|entry| entry.score)
        .collect();

    assert_eq!(scores, vec![13, 12, 11, 10, 9, 8, 7, 6, 5, 4]);
    assert_eq!(table.to_record().classic.len(), MAX_ENTRIES);
}
