use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use ct_host::{Session, SessionResult};
use ct_net::model::{ContrastNet, TowerShape};
use ct_zero::network::cpu::CpuNetwork;
use ct_zero::network::dummy::DummyNetwork;
use ct_zero::zero::wrapper::ZeroSettings;

#[derive(Debug, clap::Parser)]
struct Args {
    /// Default log level, overridden by `RUST_LOG`.
    #[clap(long, global = true, default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Let the engine play against itself and print every move.
    Selfplay {
        /// Weight file, random weights are used if missing.
        #[clap(short, long)]
        model: Option<PathBuf>,
        #[clap(short, long, default_value_t = 8)]
        depth: usize,
        #[clap(short, long, default_value_t = 200)]
        simulations: u64,
        #[clap(long, default_value_t = 400)]
        moves: u32,
        #[clap(long, default_value_t = 0)]
        seed: u64,
        /// Mix dirichlet noise into the root policy.
        #[clap(long)]
        noise: bool,
    },
    /// Print the starting position as json.
    State,
}

fn main() -> ExitCode {
    let Args { log_level, command } = Args::parse();
    init_tracing(&log_level);

    let result = match command {
        Command::Selfplay {
            model,
            depth,
            simulations,
            moves,
            seed,
            noise,
        } => selfplay(model, depth, simulations, moves, seed, noise),
        Command::State => print_state(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn selfplay(
    model: Option<PathBuf>,
    depth: usize,
    simulations: u64,
    moves: u32,
    seed: u64,
    noise: bool,
) -> SessionResult<()> {
    let shape = TowerShape::default().with_depth(depth);
    let settings = if noise {
        ZeroSettings::default()
    } else {
        ZeroSettings::for_evaluation()
    };

    let mut session = match model {
        Some(path) => Session::initialize(path, shape, settings, seed)?,
        None => {
            tracing::warn!("No model given, using random weights");
            let mut rng = StdRng::seed_from_u64(seed);
            let net = ContrastNet::random(shape, &mut rng);
            Session::new(CpuNetwork::new(net), settings, rng)
        }
    };

    println!("{}", session.board());

    for _ in 0..moves {
        let think = session.think(simulations);
        let action = match think.action {
            Some(action) => action,
            None => break,
        };

        println!(
            "{}: {} ({}), value {:.3}",
            session.board().move_count(),
            action,
            action.to_u32(),
            think.value
        );
        session.apply_action(action.to_u32())?;
    }

    println!("{}", session.board());
    let state = session.state();
    println!(
        "Finished after {} moves, game over: {}, winner: {}",
        state.move_count, state.game_over, state.winner
    );
    Ok(())
}

fn print_state() -> SessionResult<()> {
    let session = Session::new(DummyNetwork, ZeroSettings::default(), StdRng::seed_from_u64(0));
    match serde_json::to_string_pretty(&session.state()) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize state: {}", e),
    }
    Ok(())
}
