use chip_maze_core::{Command, Direction, Game, LevelCatalog, Phase, Session, TileKind};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Something that can happen to a game: a player command or an agent tick.
#[derive(Debug, Clone, Copy)]
enum Event {
    Command(Command),
    Tick,
}

fn random_events(seed: u64, count: usize) -> Vec<Event> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| match rng.random_range(0..10) {
            0 => Event::Command(Command::Move(Direction::Up)),
            1 | 2 => Event::Command(Command::Move(Direction::Down)),
            3 => Event::Command(Command::Move(Direction::Left)),
            4 | 5 => Event::Command(Command::Move(Direction::Right)),
            6 => Event::Command(Command::Confirm),
            7 => Event::Command(Command::Restart),
            _ => Event::Tick,
        })
        .collect()
}

fn apply(game: &mut Game, event: Event) {
    match event {
        Event::Command(command) => {
            game.handle(command).unwrap();
        }
        Event::Tick => {
            game.tick_agents();
        }
    }
}

fn new_game() -> Game {
    Game::new(LevelCatalog::builtin().unwrap(), Session::new()).unwrap()
}

fn check_invariants(game: &Game) {
    let view = game.view();
    assert_eq!(
        view.collected_this_level + view.remaining,
        view.total_this_level
    );

    let grid = game.board().grid();
    let collectibles = grid
        .iter()
        .filter(|tile| **tile == TileKind::Collectible)
        .count();
    assert_eq!(collectibles, view.remaining);

    assert!(grid.is_valid(view.player.x, view.player.y));
    assert_ne!(grid[view.player], TileKind::Wall);

    for agent in view.agents {
        assert_ne!(grid[agent.position], TileKind::Wall);
    }
}

#[test]
fn invariants_hold_under_random_play() {
    for seed in 0..32 {
        let mut game = new_game();
        let mut lifetime = 0;
        for event in random_events(seed, 2_000) {
            apply(&mut game, event);
            check_invariants(&game);

            let now = game.session().collected_lifetime();
            assert!(now >= lifetime, "lifetime counter went down");
            lifetime = now;
        }
    }
}

#[test]
fn identical_inputs_give_identical_games() {
    for seed in [7, 1234, 99_999] {
        let events = random_events(seed, 5_000);
        let mut first = new_game();
        let mut second = new_game();
        for event in &events {
            apply(&mut first, *event);
        }
        for event in &events {
            apply(&mut second, *event);
        }
        assert_eq!(first, second);
    }
}

#[test]
fn confirm_is_a_no_op_whenever_playing() {
    let mut game = new_game();
    for event in random_events(42, 1_000) {
        apply(&mut game, event);
        if game.phase() == Phase::Playing {
            let before = game.clone();
            game.handle(Command::Confirm).unwrap();
            assert_eq!(game, before);
        }
    }
}
