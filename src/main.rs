use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::{debug, info, trace, LevelFilter};
use rand::seq::SliceRandom;
use rand::Rng;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use santase_bot::agents::{Agent, RandomAgent};
use santase_bot::algorithms::ismcts::{IsmctsAgent, SearchConfig};
use santase_bot::game::cards::{Card, CardSet, Rank, Suit};
use santase_bot::game::{Game, Move};

#[derive(Debug, Subcommand, Clone)]
enum Commands {
    /// Ask the AI for a move in a fixed opening position
    Run(RunArgs),
    /// Play AI vs random matches and report the win tally
    Benchmark(BenchmarkArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct RunArgs {
    #[clap(long, default_value_t = 2000)]
    time_per_move_ms: u64,
}

#[derive(Args, Debug, Clone, Copy)]
struct BenchmarkArgs {
    #[clap(short, long, default_value_t = 10)]
    num_games: usize,

    #[clap(long, default_value_t = 100)]
    time_per_move_ms: u64,

    /// Search workers per move, defaults to all cores
    #[clap(long)]
    workers: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,

    #[clap(short = 'v', long, default_value_t = 2)]
    verbosity: usize,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let level = match args.verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)?;

    match args.command {
        Commands::Run(run) => run_example(run),
        Commands::Benchmark(bench) => run_benchmark(bench),
    }
}

/// A fixed opening position: the opponent led the nine of hearts into our
/// dealt hand, ten of clubs turned as trump.
fn run_example(args: RunArgs) -> Result<()> {
    use Rank::*;
    use Suit::*;

    let hand: CardSet = [
        Card::new(Nine, Diamonds),
        Card::new(King, Spades),
        Card::new(Queen, Diamonds),
        Card::new(Nine, Spades),
        Card::new(Ace, Spades),
        Card::new(Ten, Hearts),
    ]
    .into_iter()
    .collect();

    let mut game = Game::new(hand, Card::new(Ten, Clubs), true)?;
    game.update_opponent_move(Move::new(Card::new(Nine, Hearts)))?;

    info!("hand: {}, responding to {}", game.hand(), Card::new(Nine, Hearts));
    let mut agent = IsmctsAgent::new(SearchConfig {
        time_per_move: Duration::from_millis(args.time_per_move_ms),
        ..Default::default()
    });
    let chosen = agent.choose_move(&game);
    println!("{}", chosen);

    Ok(())
}

fn run_benchmark(args: BenchmarkArgs) -> Result<()> {
    let mut ai = IsmctsAgent::new(SearchConfig {
        time_per_move: Duration::from_millis(args.time_per_move_ms),
        workers: args.workers,
        ..Default::default()
    });
    let mut opponent = RandomAgent::new();
    info!("benchmarking {} against {}", ai.name(), opponent.name());

    let mut rng = rand::thread_rng();
    let mut wins = 0;
    for game_index in 0..args.num_games {
        let ai_leads = game_index % 2 == 0;
        let ai_won = play_match(&mut ai, &mut opponent, &mut rng, ai_leads)?;
        if ai_won {
            wins += 1;
        }
        debug!(
            "game {}: ai {} ({} leading)",
            game_index,
            if ai_won { "won" } else { "lost" },
            if ai_leads { "ai" } else { "opponent" },
        );
    }

    info!("ai won {} of {} games", wins, args.num_games);
    println!("{}/{}", wins, args.num_games);
    Ok(())
}

/// Umpires one full match between two agents, each seeing the game through
/// its own observer view. Returns whether the first agent won.
fn play_match<R: Rng>(
    ai: &mut dyn Agent,
    opponent: &mut dyn Agent,
    rng: &mut R,
    ai_leads: bool,
) -> Result<bool> {
    let mut deck = CardSet::full().cards();
    deck.shuffle(rng);
    let ai_hand: CardSet = deck[0..6].iter().copied().collect();
    let opponent_hand: CardSet = deck[6..12].iter().copied().collect();
    let trump_card = deck[12];
    let mut stack = deck[13..].to_vec();

    let mut ai_view = Game::new(ai_hand, trump_card, !ai_leads)?;
    let mut opponent_view = Game::new(opponent_hand, trump_card, ai_leads)?;

    loop {
        let responding = ai_view.card_played().is_some();

        if ai_view.is_opponent_move() {
            let m = opponent.choose_move(&opponent_view);
            trace!("opponent plays {}", m);
            opponent_view.play_move(m)?;
            ai_view.update_opponent_move(m)?;
        } else {
            let m = ai.choose_move(&ai_view);
            trace!("ai plays {}", m);
            ai_view.play_move(m)?;
            opponent_view.update_opponent_move(m)?;
        }

        // announcements can end the game mid-trick
        if ai_view.score() >= 66 {
            return Ok(true);
        }
        if ai_view.opponent_score() >= 66 {
            return Ok(false);
        }

        if !responding {
            continue;
        }

        // a trick was resolved: deal replacements while the game is open
        if !ai_view.is_closed() {
            if let Some(face_up) = ai_view.trump_card() {
                let ai_won_trick = !ai_view.is_opponent_move();
                if stack.len() >= 2 {
                    let first = stack.pop().expect("stack has cards");
                    let second = stack.pop().expect("stack has cards");
                    let (ai_draw, opponent_draw) =
                        if ai_won_trick { (first, second) } else { (second, first) };
                    ai_view.update_drawn_card(ai_draw)?;
                    opponent_view.update_drawn_card(opponent_draw)?;
                } else if stack.len() == 1 {
                    // the loser of this trick takes the face-up trump card
                    let last = stack.pop().expect("stack has a card");
                    let (ai_draw, opponent_draw) =
                        if ai_won_trick { (last, face_up) } else { (face_up, last) };
                    ai_view.update_drawn_card(ai_draw)?;
                    opponent_view.update_drawn_card(opponent_draw)?;
                }
            }
        }

        if ai_view.hand().is_empty() {
            // nobody reached 66: the winner of the last trick leads next and
            // takes the game
            return Ok(!ai_view.is_opponent_move());
        }
    }
}
