//! Headless MINDFRAME duel
//!
//! Два враждебных бойца спавнятся в зоне видимости друг друга; печатаем
//! каждый переход mental state и позиции. Первый аргумент (опционально):
//! путь к JSON `SimulationConfig`.

use bevy::prelude::*;
use mindframe_simulation::ai::{spawn_combatant, Behavior, Chase, CombatantBlueprint, MentalStateChanged};
use mindframe_simulation::{create_headless_app, log_error, run_fixed_tick, SimulationConfig};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(error) => {
                log_error(&format!("{}: {}", path, error));
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    println!(
        "Starting MINDFRAME headless duel (seed: {}, {} Hz)",
        config.seed, config.tick_hz
    );

    let mut app = create_headless_app(config);

    let red = spawn_combatant(
        app.world_mut(),
        CombatantBlueprint {
            team: 1,
            position: Vec3::new(-5.0, 0.0, 0.0),
            sight_range: Some(12.0),
            alert_behavior: Some(Behavior::Chase(Chase::default())),
            ..default()
        },
    );
    let blue = spawn_combatant(
        app.world_mut(),
        CombatantBlueprint {
            team: 2,
            position: Vec3::new(5.0, 0.0, 0.0),
            sight_range: Some(12.0),
            ..default()
        },
    );

    let mut cursor = app
        .world()
        .resource::<Events<MentalStateChanged>>()
        .get_cursor();

    for tick in 0..1200 {
        run_fixed_tick(&mut app);

        let world = app.world();
        for change in cursor.read(world.resource::<Events<MentalStateChanged>>()) {
            let side = if change.mind == red.mind { "red" } else { "blue" };
            println!("Tick {}: {} mind → {:?}", tick, side, change.kind);
        }

        if tick % 120 == 0 {
            let red_position = world.get::<Transform>(red.agent).map(|t| t.translation);
            let blue_position = world.get::<Transform>(blue.agent).map(|t| t.translation);
            println!("Tick {}: red {:?}, blue {:?}", tick, red_position, blue_position);
        }
    }

    println!("Simulation complete!");
}
