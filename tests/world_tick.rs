//! Whole-tick scenarios driven through the public API

use std::collections::HashSet;

use glam::Vec2;
use void_arena::{Tuning, TuningError};
use void_arena::consts::SIM_DT;
use void_arena::sim::{
    EntityKind, Meal, Outcome, PowerUpKind, PropKind, PursuitState, TickInput, WalkerState, World,
    tick,
};

fn idle(world: &mut World, ticks: usize) -> usize {
    let mut meals = 0;
    for _ in 0..ticks {
        meals += tick(world, &TickInput::default(), SIM_DT).len();
    }
    meals
}

fn enforcer_state(world: &World) -> Option<PursuitState> {
    world.arena.iter().find_map(|(_, e)| match &e.as_void()?.pilot {
        void_arena::sim::Pilot::Enforcer(brain) => Some(brain.state),
        _ => None,
    })
}

#[test]
fn test_bot_hunts_nearby_food() {
    let mut world = World::new(2024);
    let bot = world.spawn_bot("bot", Vec2::ZERO, 30.0);
    for i in 0..5 {
        world.spawn_prop(Vec2::new(80.0 + i as f32 * 40.0, 0.0), PropKind::Cone);
    }

    let meals = idle(&mut world, 600);
    assert!(meals >= 5);
    let agent = world.arena.get(bot).unwrap().as_void().unwrap();
    assert!(agent.score >= 10.0);
    assert!(world.arena.get(bot).unwrap().radius > 30.0);
}

#[test]
fn test_enforcer_chases_player_then_loses_sight() {
    let mut world = World::new(7);
    world.spawn_player("player", Vec2::new(600.0, 0.0), 20.0);
    let cop = world.spawn_enforcer("cop", Vec2::ZERO);

    tick(&mut world, &TickInput::default(), SIM_DT);
    assert_eq!(enforcer_state(&world), Some(PursuitState::Chase));
    assert!(world.arena.get(cop).unwrap().vel.x > 0.0);

    // Player ducks behind a building
    let player = world.player.unwrap();
    world.arena.get_mut(player).unwrap().pos = Vec2::new(1000.0, 800.0);
    let cop_pos = world.arena.get(cop).unwrap().pos;
    let between = cop_pos.lerp(Vec2::new(1000.0, 800.0), 0.5);
    world.spawn_prop(between, PropKind::Building);

    idle(&mut world, 30);
    assert_eq!(enforcer_state(&world), Some(PursuitState::Search));
}

#[test]
fn test_swallowing_enforcer_is_penalized() {
    let mut world = World::new(11);
    let player = world.spawn_player("player", Vec2::ZERO, 150.0);
    world
        .arena
        .get_mut(player)
        .unwrap()
        .as_void_mut()
        .unwrap()
        .score = 500.0;
    world.spawn_enforcer("cop", Vec2::new(10.0, 0.0));

    let events = tick(&mut world, &TickInput::default(), SIM_DT);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].meal, Meal::Enforcer);
    assert_eq!(events[0].outcome, Outcome::Penalized(20.0));

    let agent = world.player_entity().unwrap().as_void().unwrap();
    assert_eq!(agent.score, 400.0);
    assert!(world.player_entity().unwrap().radius < 150.0);
}

#[test]
fn test_shield_blocks_being_eaten() {
    let mut world = World::new(5);
    let player = world.spawn_player("player", Vec2::ZERO, 20.0);
    world.spawn_power_up(Vec2::new(5.0, 0.0), PowerUpKind::Shield);
    tick(&mut world, &TickInput::default(), SIM_DT);

    world.spawn_bot("big", Vec2::new(10.0, 0.0), 120.0);
    idle(&mut world, 30);
    assert!(world.arena.is_live(player));
}

#[test]
fn test_custom_tuning_changes_margin() {
    let tuning = Tuning::from_json(r#"{ "eat_margin": 1.5 }"#).unwrap();
    let mut world = World::with_tuning(1, tuning).unwrap();
    world.spawn_player("player", Vec2::ZERO, 50.0);
    // Default margin would allow this; 1.5 does not
    let fence = world.spawn_prop(Vec2::new(30.0, 0.0), PropKind::Fence);
    world.arena.get_mut(fence).unwrap().radius = 40.0;

    let meals = idle(&mut world, 10);
    assert_eq!(meals, 0);
    assert!(world.arena.is_live(fence));
}

#[test]
fn test_invalid_tuning_rejected_by_world() {
    let tuning = Tuning {
        soft_push: 0.0,
        ..Tuning::default()
    };
    assert!(matches!(World::with_tuning(1, tuning), Err(TuningError::Invalid(_))));
}

#[test]
fn test_pedestrian_runs_from_dominating_void() {
    let mut world = World::new(12);
    // Outside suction range but inside the pedestrian's scan range
    world.spawn_player("player", Vec2::new(-180.0, 0.0), 40.0);
    let human = world.spawn_prop(Vec2::ZERO, PropKind::Human);

    idle(&mut world, 10);
    let e = world.arena.get(human).unwrap();
    assert_eq!(e.as_prop().unwrap().walker.as_ref().unwrap().state, WalkerState::Panic);
    assert!((e.vel - Vec2::new(world.tuning.human_panic_speed, 0.0)).length() < 1e-3);
    assert!(e.pos.x > 10.0);
    assert!(e.pos.y.abs() < 1e-3);

    // Keeps its distance once out of range
    for _ in 0..240 {
        idle(&mut world, 1);
        let e = world.arena.get(human).unwrap();
        assert!(e.pos.distance(Vec2::new(-180.0, 0.0)) > 185.0);
    }
}

#[test]
fn test_pedestrian_ignores_small_void() {
    let mut world = World::new(12);
    world.spawn_player("player", Vec2::new(-100.0, 0.0), 15.0);
    let human = world.spawn_prop(Vec2::ZERO, PropKind::Human);

    idle(&mut world, 30);
    let e = world.arena.get(human).unwrap();
    let walker = e.as_prop().unwrap().walker.as_ref().unwrap();
    assert_eq!(walker.state, WalkerState::Wander);
    assert!((e.vel.length() - walker.speed).abs() < 1e-3);
}

#[test]
fn test_crowded_run_invariants() {
    let mut world = World::new(31337);
    world.spawn_player("player", Vec2::ZERO, 25.0);
    for i in 0..10 {
        let pos = void_arena::heading(i as f32 * 0.63) * (200.0 + i as f32 * 30.0);
        world.spawn_bot(&format!("bot{i}"), pos, 15.0 + i as f32 * 3.0);
    }
    world.spawn_enforcer("cop", Vec2::new(0.0, -900.0));
    for i in 0..150 {
        let pos = void_arena::heading(i as f32 * 2.4) * (40.0 + i as f32 * 6.0);
        world.spawn_prop(pos, PropKind::ALL[i % PropKind::ALL.len()]);
    }

    let count_voids = |world: &World| world.arena.iter().filter(|(_, e)| e.is_void()).count();
    let mut voids = count_voids(&world);

    for frame in 0..1200 {
        let input = TickInput {
            steer: void_arena::heading(frame as f32 * 0.01),
        };
        let events = tick(&mut world, &input, SIM_DT);

        let mut consumed = HashSet::new();
        for event in &events {
            assert!(consumed.insert(event.consumed), "{:?} consumed twice", event.consumed);
            if matches!(event.meal, Meal::PowerUp(_)) {
                continue;
            }
            assert!(
                event.consumer_radius > event.consumed_radius * world.tuning.eat_margin,
                "{event:?} broke size dominance"
            );
        }

        let now = count_voids(&world);
        assert!(now <= voids);
        voids = now;

        for (_, e) in world.arena.iter() {
            assert!(!e.marked_for_deletion);
            assert!(e.pos.is_finite());
            if let EntityKind::Void(agent) = &e.kind {
                assert!(agent.score >= 0.0);
                assert!(e.radius >= world.tuning.min_radius);
                assert!(e.radius <= world.tuning.max_radius);
            }
        }
    }

    let standings = world.standings();
    assert_eq!(standings.len(), voids);
    assert!(standings.windows(2).all(|w| w[0].score >= w[1].score));
}
