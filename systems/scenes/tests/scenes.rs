use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serpents_core::{
    Command, DeathCause, Direction, EndReason, Event, HighScoreEntry, Mode, PlayerName, SceneKind,
    Settings,
};
use serpents_system_leaderboard::{HighScoreTable, MAX_ENTRIES};
use serpents_system_scenes::{Clock, MenuItem, OptionsItem, SceneMachine, SceneView, MAX_FRAME_DT};
use serpents_world::query;

#[derive(Debug)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn machine_with(table: HighScoreTable) -> SceneMachine {
    SceneMachine::new(Settings::default(), table, 42).with_clock(FixedClock(noon()))
}

fn steer(direction: Direction) -> Command {
    Command::Steer { direction }
}

fn tick(millis: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(millis),
    }
}

fn run(machine: &mut SceneMachine, commands: &[Command]) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        machine.apply(*command, &mut events);
    }
    events
}

/// Menu -> ModeSelect -> round in the mode at `index` of the picker.
fn start(machine: &mut SceneMachine, index: usize) -> Vec<Event> {
    let mut commands = vec![Command::Confirm];
    commands.extend(std::iter::repeat(steer(Direction::Down)).take(index));
    commands.push(Command::Confirm);
    run(machine, &commands)
}

/// Ticks a boxed round until the snake hits the right wall.
fn play_until_game_over(machine: &mut SceneMachine) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..64 {
        machine.apply(tick(250), &mut events);
        if machine.kind() != SceneKind::Playing {
            break;
        }
    }
    assert_eq!(machine.kind(), SceneKind::GameOver, "round never ended");
    events
}

#[test]
fn choosing_a_mode_creates_a_round() {
    let mut machine = machine_with(HighScoreTable::new());

    let events = start(&mut machine, 3);

    assert_eq!(machine.kind(), SceneKind::Playing);
    let round = machine.round().expect("playing owns a round");
    assert_eq!(query::mode(round), Mode::TimeAttack);
    assert_eq!(
        events,
        vec![
            Event::SceneChanged {
                from: SceneKind::Menu,
                to: SceneKind::ModeSelect,
            },
            Event::RoundStarted {
                mode: Mode::TimeAttack,
                layout: None,
            },
            Event::SceneChanged {
                from: SceneKind::ModeSelect,
                to: SceneKind::Playing,
            },
        ]
    );
}

#[test]
fn pause_freezes_every_timer() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 3);
    let _ = run(&mut machine, &[tick(100)]);
    let before = query::snapshot(machine.round().expect("round"));
    let elapsed = query::elapsed(machine.round().expect("round"));

    let _ = run(
        &mut machine,
        &[
            Command::Pause,
            tick(250),
            steer(Direction::Down),
            tick(250),
            Command::Confirm,
        ],
    );

    assert_eq!(machine.kind(), SceneKind::Paused);
    let round = machine.round().expect("paused owns a round");
    assert_eq!(query::snapshot(round), before);
    assert_eq!(query::elapsed(round), elapsed);

    let _ = run(&mut machine, &[Command::Pause]);
    assert_eq!(machine.kind(), SceneKind::Playing);
}

#[test]
fn stalled_frames_are_clamped() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 3);

    let _ = run(&mut machine, &[tick(10_000)]);

    let round = machine.round().expect("round survives a stall");
    assert_eq!(query::elapsed(round), MAX_FRAME_DT);
    assert_eq!(query::ticks(round), 2);
}

#[test]
fn steering_reaches_the_round_on_the_next_tick() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 0);

    let _ = run(
        &mut machine,
        &[steer(Direction::Up), steer(Direction::Down), tick(125)],
    );

    let round = machine.round().expect("round");
    assert_eq!(query::snake(round).heading(), Direction::Down);
}

#[test]
fn qualifying_round_leads_to_name_entry_and_leaderboard() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 1);

    let events = play_until_game_over(&mut machine);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::RoundEnded {
            mode: Mode::Boxed,
            reason: EndReason::Died(DeathCause::Boundary),
            ..
        }
    )));
    assert!(machine.round().is_none(), "round is dropped on game over");
    let score = match machine.view() {
        SceneView::GameOver { summary } => {
            assert!(summary.qualifies);
            summary.score
        }
        other => panic!("expected game over, got {other:?}"),
    };

    let _ = run(&mut machine, &[Command::Confirm]);
    assert_eq!(machine.kind(), SceneKind::HighScoreEntry);

    let events = run(
        &mut machine,
        &[
            steer(Direction::Up),
            steer(Direction::Right),
            steer(Direction::Down),
            Command::Confirm,
        ],
    );

    assert_eq!(machine.kind(), SceneKind::Leaderboard);
    assert!(events.contains(&Event::HighScoreRecorded {
        mode: Mode::Boxed,
        rank: 0,
    }));
    let entries = machine.high_scores().entries(Mode::Boxed);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name.as_str(), "B9A");
    assert_eq!(entries[0].score, score);
    assert_eq!(entries[0].timestamp, noon());
}

#[test]
fn non_qualifying_round_returns_to_menu() {
    let mut table = HighScoreTable::new();
    for index in 0..MAX_ENTRIES {
        let _ = table.insert(
            Mode::Boxed,
            HighScoreEntry::new(PlayerName::sanitize("TOP"), 10_000, noon()),
        );
        assert_eq!(table.entries(Mode::Boxed).len(), index + 1);
    }
    let mut machine = machine_with(table.clone());
    let _ = start(&mut machine, 1);
    let _ = play_until_game_over(&mut machine);

    let events = run(&mut machine, &[Command::Confirm]);

    assert_eq!(machine.kind(), SceneKind::Menu);
    assert_eq!(
        events,
        vec![Event::SceneChanged {
            from: SceneKind::GameOver,
            to: SceneKind::Menu,
        }]
    );
    assert_eq!(machine.high_scores(), &table);
}

#[test]
fn cancel_returns_to_menu_from_game_over_paused_and_leaderboard() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 1);
    let _ = play_until_game_over(&mut machine);
    let _ = run(&mut machine, &[Command::Cancel]);
    assert_eq!(machine.kind(), SceneKind::Menu);

    let _ = start(&mut machine, 0);
    let _ = run(&mut machine, &[Command::Pause, Command::Cancel]);
    assert_eq!(machine.kind(), SceneKind::Menu);
    assert!(machine.round().is_none());

    let _ = run(
        &mut machine,
        &[
            steer(Direction::Down),
            steer(Direction::Down),
            Command::Confirm,
        ],
    );
    assert_eq!(machine.kind(), SceneKind::Leaderboard);
    let _ = run(&mut machine, &[Command::Cancel]);
    assert!(matches!(
        machine.view(),
        SceneView::Menu {
            selected: MenuItem::HighScores
        }
    ));
}

#[test]
fn cancelling_name_entry_records_nothing() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = start(&mut machine, 1);
    let _ = play_until_game_over(&mut machine);

    let events = run(&mut machine, &[Command::Confirm, Command::Cancel]);

    assert_eq!(machine.kind(), SceneKind::Menu);
    assert!(machine.high_scores().entries(Mode::Boxed).is_empty());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::HighScoreRecorded { .. })));
}

#[test]
fn leaderboard_pages_cycle_through_modes() {
    let mut machine = machine_with(HighScoreTable::new());
    let _ = run(
        &mut machine,
        &[
            steer(Direction::Down),
            steer(Direction::Down),
            Command::Confirm,
            steer(Direction::Left),
        ],
    );

    assert!(matches!(
        machine.view(),
        SceneView::Leaderboard {
            mode: Mode::TimeAttack,
            ..
        }
    ));
}

#[test]
fn options_report_changes_when_left() {
    let mut machine = machine_with(HighScoreTable::new());
    let events = run(
        &mut machine,
        &[
            steer(Direction::Down),
            Command::Confirm,
            steer(Direction::Right),
            steer(Direction::Down),
            Command::Confirm,
        ],
    );
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SettingsChanged { .. })));
    assert!(matches!(
        machine.view(),
        SceneView::Options {
            selected: OptionsItem::Fullscreen,
            ..
        }
    ));

    let events = run(&mut machine, &[Command::Cancel]);

    let expected = Settings {
        scale: 5,
        fullscreen: true,
        ..Settings::default()
    };
    assert_eq!(
        events,
        vec![
            Event::SettingsChanged { settings: expected },
            Event::SceneChanged {
                from: SceneKind::Options,
                to: SceneKind::Menu,
            },
        ]
    );
    assert_eq!(machine.settings(), &expected);
}

#[test]
fn unchanged_options_stay_silent() {
    let mut machine = machine_with(HighScoreTable::new());
    let events = run(
        &mut machine,
        &[steer(Direction::Down), Command::Confirm, Command::Cancel],
    );

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SettingsChanged { .. })));
}
