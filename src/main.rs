//! tavola command-line entry point: interactive shell or self-play.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tavola::search::{Algorithm, SearchParams};
use tavola::shell::{run_shell_loop, Shell};
use tavola::{AiPlayer, Game, GameResult, GameState, Player, RandomPlayer, Side, Step, Variant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Line-based command shell on stdin/stdout
    Shell {
        #[arg(short, long, default_value = "chess")]
        variant: Variant,

        #[arg(short, long, default_value_t = 4)]
        depth: u8,

        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
    /// Let two computer players finish a game
    Play(PlayArgs),
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    #[arg(short, long, default_value = "checkers")]
    variant: Variant,

    #[arg(long, value_enum, default_value_t = Kind::Ai)]
    near: Kind,

    #[arg(long, value_enum, default_value_t = Kind::Ai)]
    far: Kind,

    #[arg(short, long, default_value_t = 3)]
    depth: u8,

    #[arg(short, long, default_value = "negamax")]
    algorithm: Algorithm,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many moves even if the game goes on
    #[arg(long, default_value_t = 500)]
    max_turns: u32,

    /// Write the final position here
    #[arg(long)]
    save: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Ai,
    Random,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Mode::Shell {
        variant: Variant::Chess,
        depth: 4,
        seed: 0,
    }) {
        Mode::Shell { variant, depth, seed } => {
            let mut shell = Shell::new(variant, SearchParams::new().max_depth(depth), seed);
            run_shell_loop(&mut shell).map_err(Into::into)
        }
        Mode::Play(args) => play(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn make_player(kind: Kind, params: &SearchParams, seed: u64) -> Box<dyn Player> {
    match kind {
        Kind::Ai => Box::new(AiPlayer::with_seed(params.clone(), seed)),
        Kind::Random => Box::new(RandomPlayer::new(seed)),
    }
}

fn play(args: &PlayArgs) -> GameResult<()> {
    let params = SearchParams::new()
        .max_depth(args.depth)
        .algorithm(args.algorithm)
        .randomize_ties(true);

    let mut game = Game::with_variant(args.variant);
    game.new_game();
    game.set_player(Side::Near, Some(make_player(args.near, &params, args.seed)));
    game.set_player(Side::Far, Some(make_player(args.far, &params, args.seed.wrapping_add(1))));
    info!(variant = %args.variant, depth = args.depth, algorithm = %args.algorithm, "self-play started");

    let mut turns = 0;
    while turns < args.max_turns {
        match game.run_game()? {
            Step::Moved(mv) => {
                turns += 1;
                let text = game.rules().move_to_string(game.board(), &mv);
                println!("{turns:>4} {text}");
            }
            Step::Selected(_) => {}
            Step::Finished(_) => break,
        }
    }

    print!("{game}");
    match game.state() {
        GameState::Won(side) => println!("result: {side} wins"),
        GameState::Drawn => println!("result: draw"),
        _ => println!("result: unfinished after {turns} moves"),
    }

    if let Some(path) = &args.save {
        game.save(path)?;
    }
    Ok(())
}
