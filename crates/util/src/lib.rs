//! Core type aliases, default parameters, and runtime utilities for robosets.
//!
//! This crate provides the foundational types and configuration defaults
//! used throughout the robosets workspace.
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Board position index in `[0, SLOTS)`.
pub type Slot = usize;
/// Seat index of a player, assigned in creation order starting at 0.
pub type PlayerId = usize;
/// Accepted claims. Only ever incremented, by one per accepted claim.
pub type Score = u32;
/// Monotonic counter of bulk deals, used to detect tokens cleared by a reshuffle.
pub type Epoch = u64;

// ============================================================================
// TABLE GEOMETRY
// ============================================================================
/// Number of card slots on the board.
pub const SLOTS: usize = 12;
/// Number of cards in a full deck (3^4 feature combinations).
pub const DECK_SIZE: usize = 81;
/// Cards in a claim, and the token limit per player.
pub const SET_SIZE: usize = 3;
/// Capacity of each player's pending input queue.
pub const PENDING: usize = 3;

// ============================================================================
// ROUND TIMING
// All durations in milliseconds.
// ============================================================================
/// Time without an accepted claim before the board is reshuffled.
pub const TURN_TIMEOUT: u64 = 60_000;
/// Remaining time below which the countdown is shown as a warning.
pub const TURN_WARNING: u64 = 5_000;
/// Freeze after an accepted claim.
pub const POINT_FREEZE: u64 = 1_000;
/// Freeze after a rejected claim.
pub const PENALTY_FREEZE: u64 = 3_000;
/// Countdown refresh interval.
pub const TICK: u64 = 1_000;
/// Countdown refresh interval while in warning.
pub const WARNING_TICK: u64 = 10;
/// Granularity of the freeze countdown shown to a paused player.
pub const FREEZE_TICK: u64 = 1_000;
/// Pause before a synthetic player retries after a refused or skipped press.
pub const BOT_BACKOFF: u64 = 50;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register a second-chance Ctrl+C handler for immediate (non-graceful) termination.
/// The first interrupt is expected to be handled by the caller; this fires on the next one.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = tokio::signal::ctrl_c().await;
        println!();
        log::warn!("violent interrupt received, exiting immediately");
        std::process::exit(1);
    });
}

/// Parse duration string like "250ms", "30s", "5m", "2h" into Duration.
/// A bare number is read as milliseconds.
pub fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let value: u64 = num.parse().ok()?;
    match unit {
        "" | "ms" => Some(std::time::Duration::from_millis(value)),
        "s" => Some(std::time::Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(std::time::Duration::from_secs),
        "h" => value.checked_mul(3600).map(std::time::Duration::from_secs),
        _ => None,
    }
}
