use std::time::Duration;

use serpents_core::{Cell, DeathCause, Direction, Grid, Mode, SCORE_PER_FOOD};
use serpents_world::{query, AdvanceOutcome, MazeLayout, ModeRules, RoundState};

const ONE_STEP: Duration = Duration::from_millis(125);
const FAR_FOOD: Cell = Cell::new(0, 0);

fn straight_body(head: Cell, heading: Direction, length: i32) -> Vec<Cell> {
    let (column_delta, row_delta) = heading.delta();
    (0..length)
        .map(|offset| {
            Cell::new(
                head.column() - column_delta * offset,
                head.row() - row_delta * offset,
            )
        })
        .collect()
}

fn round_with(rules: ModeRules, body: &[Cell], heading: Direction, food: Cell) -> RoundState {
    RoundState::from_geometry(rules, body, heading, Some(food), 17).expect("valid geometry")
}

#[test]
fn reversal_after_a_step_is_rejected_in_every_direction() {
    for direction in Direction::ALL {
        let body = straight_body(Cell::new(7, 7), direction, 3);
        let mut round = round_with(ModeRules::Classic, &body, direction, FAR_FOOD);

        let first = round.advance(Some(direction), ONE_STEP);
        assert_eq!(first, AdvanceOutcome::Continue);

        let second = round.advance(Some(direction.opposite()), ONE_STEP);
        assert_eq!(second, AdvanceOutcome::Continue, "{direction:?} reversed into itself");
        assert_eq!(query::snake(&round).heading(), direction);

        let (column_delta, row_delta) = direction.delta();
        let expected = Cell::new(7 + 2 * column_delta, 7 + 2 * row_delta);
        assert_eq!(query::snake(&round).head(), expected);
    }
}

#[test]
fn only_the_last_input_before_a_step_counts() {
    let body = straight_body(Cell::new(7, 7), Direction::Right, 3);
    let mut round = round_with(ModeRules::Classic, &body, Direction::Right, FAR_FOOD);

    let _ = round.advance(Some(Direction::Up), Duration::ZERO);
    let _ = round.advance(Some(Direction::Left), Duration::ZERO);
    let _ = round.advance(None, ONE_STEP);

    assert_eq!(
        query::snake(&round).heading(),
        Direction::Right,
        "the overwritten turn must be discarded"
    );
    assert_eq!(query::snake(&round).head(), Cell::new(8, 7));
}

#[test]
fn input_is_latched_once_per_step() {
    let body = straight_body(Cell::new(7, 7), Direction::Right, 3);
    let mut round = round_with(ModeRules::Classic, &body, Direction::Right, FAR_FOOD);

    let _ = round.advance(Some(Direction::Down), ONE_STEP * 2);

    let cells: Vec<Cell> = query::snake(&round).cells().collect();
    assert_eq!(cells[0], Cell::new(7, 9));
    assert_eq!(cells[1], Cell::new(7, 8));
}

#[test]
fn wrapping_modes_reenter_at_every_edge() {
    let cases = [
        (Cell::new(15, 7), Direction::Right, Cell::new(0, 7)),
        (Cell::new(0, 7), Direction::Left, Cell::new(15, 7)),
        (Cell::new(7, 13), Direction::Down, Cell::new(7, 0)),
        (Cell::new(7, 0), Direction::Up, Cell::new(7, 13)),
    ];

    for rules in [ModeRules::Classic, ModeRules::TimeAttack] {
        for (head, heading, wrapped) in cases {
            let body = straight_body(head, heading, 3);
            let mut round = round_with(rules, &body, heading, Cell::new(3, 3));

            let outcome = round.advance(None, ONE_STEP);

            assert_eq!(outcome, AdvanceOutcome::Continue, "{rules:?} {heading:?}");
            assert_eq!(query::snake(&round).head(), wrapped);
        }
    }
}

#[test]
fn walled_modes_die_at_every_edge() {
    let cases = [
        (Cell::new(15, 7), Direction::Right),
        (Cell::new(0, 7), Direction::Left),
        (Cell::new(7, 13), Direction::Down),
        (Cell::new(7, 0), Direction::Up),
    ];

    for rules in [ModeRules::Boxed, ModeRules::Maze(MazeLayout::CORNERS)] {
        for (head, heading) in cases {
            let body = straight_body(head, heading, 3);
            let mut round = round_with(rules, &body, heading, Cell::new(9, 9));

            let outcome = round.advance(None, ONE_STEP);

            assert_eq!(
                outcome,
                AdvanceOutcome::Died(DeathCause::Boundary),
                "{rules:?} {heading:?}"
            );
            assert_eq!(query::death_cause(&round), Some(DeathCause::Boundary));
        }
    }
}

#[test]
fn boxed_dies_where_classic_wraps() {
    let body = [Cell::new(15, 7), Cell::new(14, 7), Cell::new(13, 7)];

    let mut boxed = round_with(ModeRules::Boxed, &body, Direction::Right, FAR_FOOD);
    assert_eq!(
        boxed.advance(None, ONE_STEP),
        AdvanceOutcome::Died(DeathCause::Boundary)
    );
    assert!(!query::is_alive(&boxed));

    let mut classic = round_with(ModeRules::Classic, &body, Direction::Right, FAR_FOOD);
    assert_eq!(classic.advance(None, ONE_STEP), AdvanceOutcome::Continue);
    assert_eq!(query::snake(&classic).head(), Cell::new(0, 7));
    assert!(query::is_alive(&classic));
}

#[test]
fn maze_walls_are_lethal() {
    let layout = MazeLayout::PILLARS;
    let body = straight_body(Cell::new(3, 3), Direction::Right, 2);
    let mut round = round_with(ModeRules::Maze(layout), &body, Direction::Right, FAR_FOOD);

    let outcome = round.advance(None, ONE_STEP);

    assert_eq!(outcome, AdvanceOutcome::Died(DeathCause::Obstacle));
    assert_eq!(query::snake(&round).head(), Cell::new(3, 3));
}

#[test]
fn chasing_the_tail_does_not_collide() {
    let body = [
        Cell::new(5, 5),
        Cell::new(6, 5),
        Cell::new(6, 6),
        Cell::new(5, 6),
    ];
    let mut round = round_with(ModeRules::Boxed, &body, Direction::Left, FAR_FOOD);

    let outcome = round.advance(Some(Direction::Down), ONE_STEP);

    assert_eq!(outcome, AdvanceOutcome::Continue);
    assert_eq!(query::snake(&round).head(), Cell::new(5, 6));
    assert_eq!(query::snake(&round).len(), 4);
}

#[test]
fn running_into_the_body_is_fatal() {
    let body = [
        Cell::new(5, 5),
        Cell::new(6, 5),
        Cell::new(6, 6),
        Cell::new(5, 6),
        Cell::new(4, 6),
    ];
    let mut round = round_with(ModeRules::Classic, &body, Direction::Left, FAR_FOOD);

    let outcome = round.advance(Some(Direction::Down), ONE_STEP);

    assert_eq!(outcome, AdvanceOutcome::Died(DeathCause::SelfCollision));
}

#[test]
fn eating_food_scores_grows_and_speeds_up() {
    let body = straight_body(Cell::new(7, 7), Direction::Right, 3);
    let mut round = round_with(ModeRules::Classic, &body, Direction::Right, Cell::new(8, 7));

    let outcome = round.advance(None, ONE_STEP);

    assert_eq!(outcome, AdvanceOutcome::FoodEaten);
    assert_eq!(query::score(&round), SCORE_PER_FOOD);
    assert_eq!(query::foods_eaten(&round), 1);
    assert_eq!(query::snake(&round).len(), 4);
    assert_eq!(query::ticks_per_second(&round), 8.25);
    let food = query::food(&round).expect("food respawned");
    assert!(!query::snake(&round).cells().any(|cell| cell == food));
}

#[test]
fn respawned_food_avoids_snake_and_walls() {
    let layout = MazeLayout::RAILS;
    for seed in 0..64 {
        let body = straight_body(Cell::new(4, 7), Direction::Right, 4);
        let mut round = RoundState::from_geometry(
            ModeRules::Maze(layout),
            &body,
            Direction::Right,
            Some(Cell::new(5, 7)),
            seed,
        )
        .expect("valid geometry");

        assert_eq!(round.advance(None, ONE_STEP), AdvanceOutcome::FoodEaten);

        let food = query::food(&round).expect("food respawned");
        assert!(Grid::in_bounds(food));
        assert!(!layout.walls().contains(&food), "seed {seed} put food on a wall");
        assert!(
            !query::snake(&round).cells().any(|cell| cell == food),
            "seed {seed} put food on the snake"
        );
    }
}

#[test]
fn filling_the_board_ends_the_round_without_death() {
    let serpentine: Vec<Cell> = (0..Grid::ROWS)
        .flat_map(|row| {
            let columns: Vec<i32> = if row % 2 == 0 {
                (0..Grid::COLUMNS).collect()
            } else {
                (0..Grid::COLUMNS).rev().collect()
            };
            columns.into_iter().map(move |column| Cell::new(column, row))
        })
        .collect();
    let (last, rest) = serpentine.split_last().expect("non-empty board");
    let body: Vec<Cell> = rest.iter().rev().copied().collect();

    let mut round = round_with(ModeRules::Boxed, &body, Direction::Left, *last);
    let outcome = round.advance(None, ONE_STEP);

    assert_eq!(outcome, AdvanceOutcome::BoardFilled);
    assert!(query::is_alive(&round));
    assert_eq!(query::food(&round), None);
    assert_eq!(query::score(&round), SCORE_PER_FOOD);
    assert_eq!(query::snake(&round).len(), Grid::CELL_COUNT);
}

#[test]
fn time_attack_scores_a_point_per_second() {
    let body = straight_body(Cell::new(3, 7), Direction::Right, 3);
    let mut round = round_with(ModeRules::TimeAttack, &body, Direction::Right, FAR_FOOD);

    for _ in 0..450 {
        let outcome = round.advance(None, Duration::from_millis(100));
        assert_eq!(outcome, AdvanceOutcome::Continue);
    }

    assert_eq!(query::elapsed(&round), Duration::from_secs(45));
    assert_eq!(query::foods_eaten(&round), 0);
    assert_eq!(query::score(&round), 45);
    assert_eq!(
        query::time_remaining(&round),
        Some(Duration::from_secs(75))
    );
}

#[test]
fn time_attack_expires_at_two_minutes_after_scoring_the_last_second() {
    let body = straight_body(Cell::new(3, 7), Direction::Right, 3);
    let mut round = round_with(ModeRules::TimeAttack, &body, Direction::Right, FAR_FOOD);

    let mut outcome = AdvanceOutcome::Continue;
    let mut frames = 0;
    while outcome == AdvanceOutcome::Continue {
        outcome = round.advance(None, Duration::from_millis(500));
        frames += 1;
    }

    assert_eq!(outcome, AdvanceOutcome::TimeExpired);
    assert_eq!(frames, 240);
    assert_eq!(query::score(&round), 120);
    assert!(query::is_alive(&round));
}

#[test]
fn untimed_modes_never_expire() {
    for mode in [Mode::Classic, Mode::Boxed, Mode::Maze] {
        let rules = ModeRules::for_mode(mode, MazeLayout::CORNERS);
        assert!(query::time_remaining(&RoundState::new(rules, 0)).is_none());
    }
}
