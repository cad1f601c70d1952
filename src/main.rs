//! Orb Fusion headless demo
//!
//! Plays a session without a renderer: drops on a fixed cadence at
//! pseudo-random positions, logs what happens and prints the final snapshot
//! as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::path::PathBuf;

    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use orb_fusion::sim::{GameEvent, GameState, TickInput, tick};
    use orb_fusion::tuning::Tuning;

    #[derive(Parser)]
    #[command(name = "orb-fusion")]
    #[command(about = "Play a headless Orb Fusion session and print the final snapshot")]
    pub struct Args {
        /// Session seed
        #[arg(long, default_value_t = 42)]
        pub seed: u64,
        /// Maximum ticks to simulate
        #[arg(long, default_value_t = 3600)]
        pub ticks: u64,
        /// Ticks between drop attempts
        #[arg(long, default_value_t = 45)]
        pub drop_every: u64,
        /// JSON tuning file; omitted keys keep their defaults
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

    pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };

        log::info!("Orb Fusion demo: seed {}, {} ticks", args.seed, args.ticks);

        let container = tuning.container;
        let mut state = GameState::with_tuning(tuning, args.seed);
        // Separate stream so the autoplayer never perturbs the session RNG
        let mut player = Pcg32::seed_from_u64(args.seed ^ 0x5eed);
        let drop_every = args.drop_every.max(1);

        for t in 0..args.ticks {
            let mut input = TickInput::default();
            if t % drop_every == 0 {
                input.aim_x = Some(player.random_range(container.left()..container.right()));
                input.drop = true;
            }

            tick(&mut state, &input);

            for event in &state.events {
                match event {
                    GameEvent::Merged { combo, .. } if *combo > 1 => {
                        log::debug!("t={} combo x{}", state.time_ticks, combo)
                    }
                    GameEvent::ContainmentRestored { id } => {
                        log::warn!("t={} orb {} restored", state.time_ticks, id.0)
                    }
                    GameEvent::OutcomeChanged { outcome } => {
                        log::info!("t={} outcome {:?}", state.time_ticks, outcome)
                    }
                    _ => {}
                }
            }

            if !state.is_running() {
                break;
            }
        }

        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();

    if let Err(e) = demo::run(demo::Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts drive the simulation through the library on the web
}
