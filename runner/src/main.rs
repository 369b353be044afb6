// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for single games, batches, and stored results
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use kingdom_agents::{Agent, HeuristicAgent, RandomAgent};
use kingdom_engine::GameConfig;
use kingdom_sim::{run_batch, run_game, GameRepository, SqliteStore};
use std::collections::HashMap;

#[derive(Parser)]
#[command(name = "kingdom-runner", about = "Machiavelli's Kingdom game lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game and print the result
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        /// Agent type: "random", "heuristic", or "mixed"
        #[arg(short, long, default_value = "heuristic")]
        agent: String,
        /// Print the full action log
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run a batch of games into a database
    Batch {
        #[arg(short, long, default_value_t = 100)]
        games: u64,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        #[arg(short, long, default_value = "games.db")]
        db: String,
        /// Agent type: "random", "heuristic", or "mixed"
        #[arg(short, long, default_value = "mixed")]
        agent: String,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
    /// List games stored in a database
    Games {
        #[arg(short, long, default_value = "games.db")]
        db: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play {
            seed,
            players,
            agent,
            verbose,
        } => cmd_play(seed, players, &agent, verbose),
        Commands::Batch {
            games,
            players,
            db,
            agent,
            seed,
        } => cmd_batch(games, players, &db, &agent, seed),
        Commands::Games { db } => cmd_games(&db),
    }
}

fn cmd_play(seed: u64, players: usize, agent_type: &str, verbose: bool) {
    println!("=== Machiavelli's Kingdom ===\n");
    println!(
        "Running one game: seed={}, players={}, agents={}\n",
        seed, players, agent_type
    );

    let mut agents = make_agents(seed, players, agent_type);
    match run_game(&mut agents, seed, &GameConfig::default(), 50_000) {
        Ok((state, summary)) => {
            if verbose {
                for line in &state.action_log {
                    println!("  {}", line);
                }
                println!();
            }
            println!(
                "Game finished in {} rounds ({} actions).",
                summary.rounds, summary.actions
            );
            match &summary.winner {
                Some(name) => println!("  Winner: {}\n", name),
                None => println!("  No winner declared\n"),
            }
            println!(
                "  {:<10} {:<10} {:<6} {:>8} {:>6} {:>9} {:>6}",
                "Seat", "Agent", "Title", "Prestige", "Gold", "Soldiers", "Towns"
            );
            println!("  {}", "-".repeat(62));
            for p in &summary.players {
                println!(
                    "  {:<10} {:<10} {:<6} {:>8} {:>6} {:>9} {:>6}{}",
                    p.name,
                    p.agent,
                    p.title,
                    p.prestige,
                    p.gold,
                    p.soldiers,
                    p.towns,
                    if p.winner { "  *" } else { "" }
                );
            }
        }
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn cmd_batch(games: u64, players: usize, db_path: &str, agent_type: &str, base_seed: u64) {
    println!(
        "=== Batch: {} games, {} players, agents={} ===\n",
        games, players, agent_type
    );

    let mut repo = match SqliteStore::open(db_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Cannot open {}: {}", db_path, e);
            return;
        }
    };

    let kind = agent_type.to_string();
    let summaries = match run_batch(
        &mut repo,
        move |seed| make_agents(seed, players, &kind),
        games,
        base_seed,
        &GameConfig::default(),
        50_000,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Batch error: {}", e);
            return;
        }
    };

    let mut wins: HashMap<String, u32> = HashMap::new();
    for summary in &summaries {
        for p in &summary.players {
            if p.winner {
                *wins.entry(format!("{} ({})", p.name, p.agent)).or_insert(0) += 1;
            }
        }
    }

    println!(
        "--- Summary ({} of {} games finished) ---",
        summaries.len(),
        games
    );
    let mut table: Vec<(&String, &u32)> = wins.iter().collect();
    table.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (who, count) in table {
        let pct = *count as f64 / games as f64 * 100.0;
        println!("  {:<22}: {:>4} wins ({:.1}%)", who, count, pct);
    }
    println!("\nResults saved to: {}", db_path);
}

fn cmd_games(db_path: &str) {
    let repo = match SqliteStore::open(db_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Cannot open {}: {}", db_path, e);
            return;
        }
    };
    let rows = match repo.list() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Cannot list games: {}", e);
            return;
        }
    };
    if rows.is_empty() {
        println!("No games stored. Run a batch first.");
        return;
    }
    println!(
        "{:<16} {:>6} {:<12} {:>8}",
        "Game", "Round", "Phase", "Players"
    );
    println!("{}", "-".repeat(46));
    for row in rows {
        println!(
            "{:<16} {:>6} {:<12} {:>8}",
            row.id, row.round, row.phase, row.players
        );
    }
}

/// One agent per seat. Mixed tables alternate heuristic and random.
fn make_agents(seed: u64, players: usize, agent_type: &str) -> Vec<Box<dyn Agent>> {
    (0..players)
        .map(|i| {
            let agent_seed = seed.wrapping_add(i as u64);
            let boxed: Box<dyn Agent> = match agent_type {
                "random" => Box::new(RandomAgent::new(agent_seed)),
                "mixed" if i % 2 == 1 => Box::new(RandomAgent::new(agent_seed)),
                _ => Box::new(HeuristicAgent::new(agent_seed)),
            };
            boxed
        })
        .collect()
}
