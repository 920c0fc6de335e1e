//! Void Arena headless runner
//!
//! Seeds a world, scatters props, bots, enforcers and power-ups around the
//! origin, then drives a scripted player through the fixed-timestep stepper
//! and prints the final standings as JSON.
//!
//! Usage: `void-arena [--seed N] [--seconds S] [--tuning tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use thiserror::Error;

    use void_arena::sim::{
        ConsumeEvent, EntityId, Meal, Outcome, PowerUpKind, PropKind, Stepper, TickInput, Upgrade, World,
    };
    use void_arena::{Tuning, TuningError, heading};

    /// Frame time the runner pretends to render at (a little slower than the sim)
    const FRAME_DT: f32 = 1.0 / 50.0;
    /// Half-width of the populated square
    const SCATTER_EXTENT: f32 = 1800.0;
    /// Keep spawns this far from the player
    const SPAWN_CLEARANCE: f32 = 250.0;

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error(transparent)]
        Tuning(#[from] TuningError),
        #[error("failed to encode standings: {0}")]
        Json(#[from] serde_json::Error),
    }

    #[derive(Parser, Debug)]
    #[command(name = "void-arena", version, about = "Headless Void Arena simulation runner")]
    pub struct Cli {
        /// Seed for the world RNG and the scatter layout
        #[arg(long, default_value_t = 42)]
        pub seed: u64,
        /// Simulated seconds to run before printing standings
        #[arg(long, default_value_t = 60.0, value_parser = positive_seconds)]
        pub seconds: f32,
        /// Optional JSON file with tuning overrides
        #[arg(short, long)]
        pub tuning: Option<PathBuf>,
    }

    fn positive_seconds(raw: &str) -> Result<f32, String> {
        let seconds: f32 = raw.parse().map_err(|e| format!("{e}"))?;
        if seconds.is_finite() && seconds > 0.0 {
            Ok(seconds)
        } else {
            Err(format!("expected a positive number of seconds, got {seconds}"))
        }
    }

    /// Populate the world. Placement draws from its own RNG, not the gameplay stream.
    fn scatter(world: &mut World) {
        let mut rng = Pcg32::seed_from_u64(world.seed ^ 0x5eed_5eed);
        let spot = |rng: &mut Pcg32| loop {
            let pos = Vec2::new(
                rng.random_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                rng.random_range(-SCATTER_EXTENT..SCATTER_EXTENT),
            );
            if pos.length() > SPAWN_CLEARANCE {
                return pos;
            }
        };

        // Small things are common, buildings rare
        let edible = &PropKind::ALL[..PropKind::ALL.len() - 1];
        for _ in 0..400 {
            let roll: f32 = rng.random();
            let kind = edible[((roll * roll) * edible.len() as f32) as usize];
            let pos = spot(&mut rng);
            world.spawn_prop(pos, kind);
        }
        for _ in 0..4 {
            let pos = spot(&mut rng);
            world.spawn_prop(pos, PropKind::PoliceCar);
        }
        for i in 0..8 {
            let pos = spot(&mut rng);
            let radius = rng.random_range(15.0..35.0);
            world.spawn_bot(&format!("bot-{}", i + 1), pos, radius);
        }
        world.spawn_enforcer("enforcer-1", Vec2::new(1000.0, 0.0));
        world.spawn_enforcer("enforcer-2", Vec2::new(-1000.0, 0.0));

        let kinds = [PowerUpKind::Speed, PowerUpKind::Magnet, PowerUpKind::Shield];
        for i in 0..6 {
            let pos = spot(&mut rng);
            world.spawn_power_up(pos, kinds[i % kinds.len()]);
        }
        log::info!("scattered {} entities", world.arena.len());
    }

    /// Slow spiral with a pause every ten seconds
    fn scripted_steer(t: f32) -> Vec2 {
        if t % 10.0 > 9.0 {
            Vec2::ZERO
        } else {
            heading(t * 0.35)
        }
    }

    fn agent_name(world: &World, id: EntityId) -> String {
        world
            .arena
            .get(id)
            .and_then(|e| e.as_void())
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }

    fn react(world: &mut World, event: &ConsumeEvent) {
        let consumer = agent_name(world, event.consumer);
        match (event.meal, event.outcome) {
            (Meal::Void { .. }, Outcome::Grew(amount)) => {
                log::info!("{} swallowed {} (+{:.0})", consumer, agent_name(world, event.consumed), amount);
                world.spawn_particles(event.position, 24, 220.0);
                world.spawn_floating_text(event.position, format!("+{amount:.0}"));
            }
            (_, Outcome::Penalized(amount)) => {
                log::info!("{} ate an enforcer and shrank by {:.0}", consumer, amount);
                world.spawn_floating_text(event.position, format!("-{amount:.0}"));
            }
            (Meal::PowerUp(kind), _) => {
                log::debug!("{} picked up {:?}", consumer, kind);
                world.spawn_floating_text(event.position, format!("{kind:?}"));
            }
            (meal, outcome) => {
                log::trace!("{} ate {:?} -> {:?}", consumer, meal, outcome);
                world.spawn_particles(event.position, 4, 80.0);
            }
        }
    }

    pub fn run() -> Result<(), RunError> {
        let cli = Cli::parse();
        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let mut world = World::with_tuning(cli.seed, tuning)?;
        world.spawn_player("player", Vec2::ZERO, 20.0);
        scatter(&mut world);
        log::info!("Void Arena starting with seed {}", world.seed);

        let mut stepper = Stepper::new();
        let frames = (cli.seconds / FRAME_DT).ceil() as u32;
        let mut upgrades = Upgrade::POOL.into_iter().cycle();
        let mut meals = 0usize;

        for frame in 0..frames {
            let input = TickInput {
                steer: scripted_steer(frame as f32 * FRAME_DT),
            };
            let events = stepper.run(&mut world, &input, FRAME_DT);
            meals += events.len();
            for event in &events {
                react(&mut world, event);
            }

            if world.check_player_level().is_some() {
                if let (Some(id), Some(upgrade)) = (world.player, upgrades.next()) {
                    world.upgrade(id, upgrade);
                }
            }
            if world.player_entity().is_none() {
                log::info!("player was swallowed at {:.1}s", frame as f32 * FRAME_DT);
                break;
            }
        }

        log::info!(
            "ran {} ticks ({} meals), {} entities left",
            world.time_ticks,
            meals,
            world.arena.len()
        );
        println!("{}", serde_json::to_string_pretty(&world.standings())?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    match headless::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("void-arena: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; there is no headless runner
}
