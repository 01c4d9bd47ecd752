use clap::Parser;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position};

use tavola::rules::{board_from_fen, perft, Rules};
use tavola::Variant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Count leaf nodes of the legal move tree", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chess")]
    variant: Variant,

    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    /// Chess position to start from instead of the initial setup
    #[arg(short, long)]
    fen: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let rules = Rules::new(args.variant);
    let mut board = match &args.fen {
        Some(_) if args.variant != Variant::Chess => {
            return Err(format!("--fen only describes chess positions, not {}", args.variant).into());
        }
        Some(fen) => board_from_fen(fen)?,
        None => rules.setup_board(),
    };

    println!("Running perft on {} at depth {}", args.variant, args.depth);
    let start = std::time::Instant::now();
    let nodes = perft(&rules, &mut board, args.depth)?;
    let duration = start.elapsed();
    println!(
        "tavola perft({}) = {} nodes ({} ms)",
        args.depth,
        nodes,
        duration.as_millis()
    );

    if args.variant == Variant::Chess {
        let pos: Chess = match &args.fen {
            Some(text) => {
                let fen: Fen = text.parse()?;
                fen.into_position(CastlingMode::Standard)?
            }
            None => Chess::default(),
        };
        let expected = perft_shakmaty(&pos, args.depth);
        println!("shakmaty perft({}) = {} nodes", args.depth, expected);
        if expected != nodes {
            return Err(format!("mismatch: tavola {nodes}, shakmaty {expected}").into());
        }
    }
    Ok(())
}

fn perft_shakmaty(pos: &Chess, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    for m in pos.legal_moves() {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += perft_shakmaty(&new_pos, depth - 1);
    }
    nodes
}
