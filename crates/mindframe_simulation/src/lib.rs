//! MINDFRAME Simulation Core
//!
//! Headless ECS-симуляция на Bevy 0.16:
//! - modules: слабосвязанные модули, привязанные к одному parent entity
//! - ai: когнитивный стек Mind → MentalState → Behavior
//! - physics: headless замена внешнего character controller
//! - replication: snapshot-контракт для неавторитетных реплик
//!
//! Рендеринг, транспорт, pathfinding и физический движок внешние;
//! ядро общается с ними через `NavigationService`, `SensorEvent`,
//! `MovementInput` и `MindSnapshot`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod components;
pub mod config;
pub mod logger;
pub mod modules;
pub mod physics;
pub mod replication;

pub use ai::{AIPlugin, Behavior, MentalState, MentalStateKind, Mind, MindConfig};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel};
pub use modules::{Module, ModuleHost, ModulePlugin, Modules, ParentKind};
pub use physics::{KinematicController, KinematicControllerPlugin, MovementInput};
pub use replication::{MindSnapshot, ReplicationPlugin};

/// Fixed-tick pipeline (chain в этом порядке)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Триггеры привязки + очистка реестра
    Modules,
    /// Sensor refresh (Detection)
    Perception,
    /// Mind think + aiming
    Cognition,
    /// Behavior → navigation → wish-velocity
    Movement,
    /// Интеграция controller
    Physics,
    /// Snapshot publish / apply
    Replication,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        logger::set_log_level(self.config.log_level);

        app.insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz))
            .insert_resource(DeterministicRng::new(self.config.seed))
            .insert_resource(self.config.clone())
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Modules,
                    SimulationSet::Perception,
                    SimulationSet::Cognition,
                    SimulationSet::Movement,
                    SimulationSet::Physics,
                    SimulationSet::Replication,
                )
                    .chain(),
            )
            .add_plugins((
                ModulePlugin,
                AIPlugin,
                KinematicControllerPlugin,
                ReplicationPlugin,
            ));
    }
}

/// Детерминистичный RNG (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Минимальный headless App со всей симуляцией
pub fn create_headless_app(config: SimulationConfig) -> App {
    init_logger();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(config));

    app
}

/// Сдвинуть `Time<Fixed>` на один timestep и прогнать `FixedUpdate` один раз.
///
/// Детерминистичный шаг для headless бинарника и тестов (без wall-clock).
/// `First` здесь не запускается, поэтому event-буферы симуляции
/// переключаются в начале каждого тика: событие читается в тике отправки
/// и в следующем. Кто гоняет App через `app.update()`, получает обычный
/// swap и не должен смешивать оба способа.
pub fn run_fixed_tick(app: &mut App) {
    let world = app.world_mut();
    swap_simulation_events(world);

    let timestep = world.resource::<Time<Fixed>>().timestep();
    world.resource_mut::<Time<Fixed>>().advance_by(timestep);
    world.run_schedule(FixedUpdate);
}

fn swap_simulation_events(world: &mut World) {
    swap_events::<modules::ModuleRegistered>(world);
    swap_events::<modules::ModuleRemoved>(world);
    swap_events::<modules::ModuleRegistrationFailed>(world);
    swap_events::<ai::SensorEvent>(world);
    swap_events::<ai::DamageTaken>(world);
    swap_events::<ai::MentalStateChanged>(world);
    swap_events::<replication::MindSnapshotReady>(world);
    swap_events::<replication::MindReplicated>(world);
}

fn swap_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
