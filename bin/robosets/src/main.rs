//! Terminal Set Table
//!
//! Runs one game with stdin-driven humans and synthetic players.
//! Humans play by typing `<player> <slot>` lines.
//!
//! Options: --config, --humans, --fish, --sharks, --json, timing overrides
use anyhow::Context;
use clap::Parser;
use rbs_cards::Classic;
use rbs_core::*;
use rbs_gameroom::*;
use rbs_players::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;

#[derive(Debug, Parser)]
#[command(name = "robosets", about = "Live set game with robot opponents")]
struct Args {
    /// JSON file with game parameters; flags below override it
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Players fed from stdin
    #[arg(long, default_value_t = 1)]
    humans: usize,
    /// Robots pressing random slots
    #[arg(long, default_value_t = 1)]
    fish: usize,
    /// Robots that look for sets
    #[arg(long, default_value_t = 0)]
    sharks: usize,
    #[arg(long)]
    slots: Option<usize>,
    #[arg(long)]
    deck: Option<usize>,
    /// Round length without an accepted claim, e.g. 60s
    #[arg(long, value_parser = duration)]
    timeout: Option<Duration>,
    #[arg(long, value_parser = duration)]
    point_freeze: Option<Duration>,
    #[arg(long, value_parser = duration)]
    penalty_freeze: Option<Duration>,
    /// Print display events to stdout as JSON lines
    #[arg(long)]
    json: bool,
}

fn duration(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration: {}", s))
}

impl Args {
    fn settings(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Config::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
            }
            None => Config::default(),
        };
        config.slots = self.slots.unwrap_or(config.slots);
        config.deck_size = self.deck.unwrap_or(config.deck_size);
        config.turn_timeout = self.timeout.unwrap_or(config.turn_timeout);
        config.point_freeze = self.point_freeze.unwrap_or(config.point_freeze);
        config.penalty_freeze = self.penalty_freeze.unwrap_or(config.penalty_freeze);
        Ok(config)
    }
    fn table(&self, config: Config) -> Game {
        let mut game = match self.json {
            true => {
                let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Event>();
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        println!("{}", event.to_json());
                    }
                });
                Game::new(config, Classic, tx)
            }
            false => Game::new(config, Classic, Console),
        };
        (0..self.humans).for_each(|_| {
            game.sit_human();
        });
        (0..self.fish).for_each(|_| {
            game.sit_robot(Fish);
        });
        (0..self.sharks).for_each(|_| {
            game.sit_robot(Shark::new(Classic));
        });
        game
    }
}

/// Forwards `<player> <slot>` lines from stdin to the table.
async fn keyboard(seats: Vec<Arc<Seat>>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut words = line.split_whitespace().map(str::parse::<usize>);
        match (words.next(), words.next()) {
            (Some(Ok(player)), Some(Ok(slot))) => match seats.get(player) {
                Some(seat) if seat.is_human() => match seat.press(slot) {
                    Press::Queued => log::debug!("P{} pressed #{}", player, slot),
                    Press::Dropped(why) => log::info!("P{} #{} ignored: {}", player, slot, why),
                },
                Some(_) => log::warn!("P{} is a robot", player),
                None => log::warn!("no player P{}", player),
            },
            _ => log::warn!("expected `<player> <slot>`, got {:?}", line),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rbs_core::log();
    rbs_core::kys();
    let args = Args::parse();
    let config = args.settings()?;
    let mut handle = args.table(config).start()?;
    tokio::spawn(keyboard(handle.seats().to_vec()));
    let interrupted = tokio::select! {
        winners = handle.wait() => Some(winners),
        _ = tokio::signal::ctrl_c() => None,
    };
    let winners = match interrupted {
        Some(winners) => winners?,
        None => {
            handle.terminate();
            handle.wait().await?
        }
    };
    log::info!("final scores {:?}", handle.scores());
    let names = winners
        .iter()
        .map(|p| format!("P{}", p))
        .collect::<Vec<_>>()
        .join(", ");
    println!("winners: {}", names);
    Ok(())
}
