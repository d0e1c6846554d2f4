//! Module bindings driven by the scene graph (systems, not direct calls).

use bevy::prelude::*;
use mindframe_simulation::modules::{set_module_enabled, ModuleRegistrationFailed};
use mindframe_simulation::{
    agent_host, create_headless_app, run_fixed_tick, vehicle_host, LogLevel, Module, ModuleHost,
    ParentKind, SimulationConfig,
};

fn test_app() -> App {
    create_headless_app(SimulationConfig {
        log_level: LogLevel::Error,
        ..default()
    })
}

fn parent_of(app: &App, module: Entity) -> Option<Entity> {
    app.world().get::<Module>(module).unwrap().parent()
}

fn host_lists(app: &App, host: Entity, module: Entity) -> bool {
    app.world().get::<ModuleHost>(host).unwrap().contains(module)
}

#[test]
fn test_spawned_module_binds_on_next_tick() {
    let mut app = test_app();
    let agent = app.world_mut().spawn(agent_host(1)).id();
    let pivot = app.world_mut().spawn((Transform::default(), ChildOf(agent))).id();
    let module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(pivot)))
        .id();

    run_fixed_tick(&mut app);

    assert_eq!(parent_of(&app, module), Some(agent));
    assert!(host_lists(&app, agent, module));
}

#[test]
fn test_moving_an_ancestor_rebinds_the_subtree() {
    let mut app = test_app();
    let first = app.world_mut().spawn(agent_host(1)).id();
    let second = app.world_mut().spawn(agent_host(1)).id();
    let pivot = app.world_mut().spawn(ChildOf(first)).id();
    let module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(pivot)))
        .id();
    run_fixed_tick(&mut app);
    assert_eq!(parent_of(&app, module), Some(first));

    // Only the pivot moves; the module's own ChildOf is untouched
    app.world_mut().entity_mut(pivot).insert(ChildOf(second));
    run_fixed_tick(&mut app);

    assert_eq!(parent_of(&app, module), Some(second));
    assert!(!host_lists(&app, first, module));
    assert!(host_lists(&app, second, module));
}

#[test]
fn test_vehicle_module_skips_agent_in_between() {
    let mut app = test_app();
    let vehicle = app.world_mut().spawn(vehicle_host()).id();
    let driver = app.world_mut().spawn((agent_host(1), ChildOf(vehicle))).id();
    let agent_module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(driver)))
        .id();
    let vehicle_module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Vehicle), ChildOf(driver)))
        .id();

    run_fixed_tick(&mut app);

    assert_eq!(parent_of(&app, agent_module), Some(driver));
    assert_eq!(parent_of(&app, vehicle_module), Some(vehicle));
}

#[test]
fn test_detached_module_fails_and_fires_hook() {
    let mut app = test_app();
    let agent = app.world_mut().spawn(agent_host(1)).id();
    let module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(agent)))
        .id();
    run_fixed_tick(&mut app);

    app.world_mut().entity_mut(module).remove::<ChildOf>();
    run_fixed_tick(&mut app);

    assert_eq!(parent_of(&app, module), None);
    assert!(!host_lists(&app, agent, module));
    let failures = app.world().resource::<Events<ModuleRegistrationFailed>>();
    assert!(failures
        .iter_current_update_events()
        .any(|failure| failure.module == module));
}

#[test]
fn test_despawned_module_is_pruned_from_host() {
    let mut app = test_app();
    let agent = app.world_mut().spawn(agent_host(1)).id();
    let module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(agent)))
        .id();
    run_fixed_tick(&mut app);
    assert!(host_lists(&app, agent, module));

    app.world_mut().entity_mut(module).despawn();
    run_fixed_tick(&mut app);

    assert!(app.world().get::<ModuleHost>(agent).unwrap().is_empty());
}

#[test]
fn test_lost_host_falls_back_to_outer_host() {
    let mut app = test_app();
    let outer = app.world_mut().spawn(agent_host(1)).id();
    let inner = app.world_mut().spawn((agent_host(1), ChildOf(outer))).id();
    let module = app
        .world_mut()
        .spawn((Module::new(ParentKind::Agent), ChildOf(inner)))
        .id();
    run_fixed_tick(&mut app);
    assert_eq!(parent_of(&app, module), Some(inner));

    app.world_mut().entity_mut(inner).remove::<ModuleHost>();
    run_fixed_tick(&mut app);

    assert_eq!(parent_of(&app, module), Some(outer));
    assert!(host_lists(&app, outer, module));
}

#[test]
fn test_toggle_enabled_through_world() {
    let mut app = test_app();
    let agent = app.world_mut().spawn(agent_host(1)).id();
    let module = app
        .world_mut()
        .spawn((Module::disabled(ParentKind::Agent), ChildOf(agent)))
        .id();
    run_fixed_tick(&mut app);
    assert_eq!(parent_of(&app, module), None, "disabled modules stay unbound");

    set_module_enabled(app.world_mut(), module, true).unwrap();
    run_fixed_tick(&mut app);
    assert_eq!(parent_of(&app, module), Some(agent));

    set_module_enabled(app.world_mut(), module, false).unwrap();
    run_fixed_tick(&mut app);
    assert_eq!(parent_of(&app, module), None);
    assert!(!host_lists(&app, agent, module));
}
