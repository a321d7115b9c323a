use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use arena_rust_server::config::WorldConfig;
use arena_rust_server::constants::{MAX_FOOD, TICK_RATE};
use arena_rust_server::gateway::Gateway;
use arena_rust_server::protocol::{ClientCommand, ServerMessage};
use arena_rust_server::sink::OutboundSink;
use arena_rust_server::types::{PlayerId, TickReport, Vec2};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Mixed into the world seed so bot steering does not mirror world placement.
const BOT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;
const TURN_PROBABILITY: f64 = 0.05;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs a headless bot match against the tick engine")]
struct Cli {
    #[arg(long, default_value_t = 8)]
    bots: usize,
    #[arg(long, default_value_t = 60)]
    seconds: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = TICK_RATE)]
    tick_rate: u32,
    #[arg(long, default_value_t = MAX_FOOD)]
    food: usize,
}

#[derive(Debug, Default)]
struct CountingSink {
    messages: AtomicUsize,
    closed: AtomicBool,
}

impl OutboundSink for CountingSink {
    fn send(&self, _message: &ServerMessage) -> bool {
        self.messages.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn close(&self, _code: u16, _reason: &str) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

struct Bot {
    id: PlayerId,
    sink: Arc<CountingSink>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationSummary {
    seed: u64,
    bots: usize,
    ticks: u64,
    eliminations: usize,
    food_eaten: usize,
    respawns: usize,
    largest_radius: f64,
    messages_sent: usize,
    mean_tick_micros: f64,
    max_tick_micros: f64,
    anomalies: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(bots = cli.bots, seconds = cli.seconds, seed, "simulation started");

    let summary = run_simulation(&cli, seed)?;
    println!(
        "{}",
        serde_json::to_string(&summary).context("failed to serialize summary")?
    );

    if !summary.anomalies.is_empty() {
        warn!(count = summary.anomalies.len(), "simulation finished with anomalies");
        std::process::exit(1);
    }
    Ok(())
}

fn run_simulation(cli: &Cli, seed: u64) -> anyhow::Result<SimulationSummary> {
    let config = WorldConfig {
        food_target: cli.food,
        tick_rate: cli.tick_rate,
        max_players: cli.bots.max(1),
        seed,
        ..WorldConfig::default()
    };
    config.validate().context("invalid simulation config")?;

    let mut gateway = Gateway::from_config(&config, Instant::now());
    let mut rng = StdRng::seed_from_u64(seed ^ BOT_SEED_SALT);
    let mut bots: Vec<Bot> = Vec::with_capacity(cli.bots);
    let mut admitted = 0usize;
    let mut seen_anomalies = HashSet::new();
    let mut total_tick_micros = 0.0;
    let mut summary = SimulationSummary {
        seed,
        bots: cli.bots,
        ticks: u64::from(cli.seconds) * u64::from(cli.tick_rate),
        ..SimulationSummary::default()
    };
    let delta_seconds = config.tick_period_secs();

    for _ in 0..summary.ticks {
        while bots.len() < cli.bots {
            bots.push(admit_bot(&mut gateway, admitted)?);
            if admitted >= cli.bots {
                summary.respawns += 1;
            }
            admitted += 1;
        }

        for bot in &bots {
            if rng.random::<f64>() < TURN_PROBABILITY {
                let dir = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
                gateway.handle_command(bot.id, ClientCommand::Move { dir });
            }
        }

        let started = Instant::now();
        let report = gateway.step(delta_seconds);
        let tick_micros = started.elapsed().as_secs_f64() * 1_000_000.0;
        total_tick_micros += tick_micros;
        summary.max_tick_micros = summary.max_tick_micros.max(tick_micros);

        summary.food_eaten += report.removed_food.len();
        summary.eliminations += report.eliminations.len();

        bots.retain(|bot| {
            let closed = bot.sink.closed.load(Ordering::Relaxed);
            if closed {
                summary.messages_sent += bot.sink.messages.load(Ordering::Relaxed);
            }
            !closed
        });

        for message in collect_anomalies(&gateway, &report, config.food_target) {
            push_anomaly(&mut summary.anomalies, &mut seen_anomalies, report.tick, message);
        }
        summary.largest_radius = gateway
            .engine()
            .world()
            .players()
            .map(|player| player.r)
            .fold(summary.largest_radius, f64::max);
    }

    summary.messages_sent += bots
        .iter()
        .map(|bot| bot.sink.messages.load(Ordering::Relaxed))
        .sum::<usize>();
    if summary.ticks > 0 {
        summary.mean_tick_micros = total_tick_micros / summary.ticks as f64;
    }
    Ok(summary)
}

fn admit_bot(gateway: &mut Gateway, index: usize) -> anyhow::Result<Bot> {
    let sink = Arc::new(CountingSink::default());
    let id = gateway
        .admit(sink.clone())
        .context("bot was refused admission")?;
    gateway.handle_command(
        id,
        ClientCommand::Spawn {
            name: format!("bot-{:02}", index + 1),
        },
    );
    debug!(player_id = id, index, "bot joined");
    Ok(Bot { id, sink })
}

fn collect_anomalies(gateway: &Gateway, report: &TickReport, food_target: usize) -> Vec<String> {
    let world = gateway.engine().world();
    let mut anomalies = Vec::new();

    if world.food_count() > food_target {
        anomalies.push(format!(
            "food above target: {}/{}",
            world.food_count(),
            food_target
        ));
    }

    for player in world.players().filter(|player| player.is_alive()) {
        if !world.bounds().contains_circle(player.pos, player.r) {
            anomalies.push(format!("player {} outside bounds", player.id));
        }
        if !player.r.is_finite() || !player.pos.x.is_finite() || !player.pos.y.is_finite() {
            anomalies.push(format!("player {} has non-finite state", player.id));
        }
    }

    let mut victims = HashSet::new();
    for elimination in &report.eliminations {
        if !victims.insert(elimination.victim_id) {
            anomalies.push(format!("player {} eliminated twice", elimination.victim_id));
        }
        if world.player(elimination.victim_id).is_some() {
            anomalies.push(format!("victim {} still in world", elimination.victim_id));
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    if seen.insert(message.clone()) {
        warn!(tick, %message, "anomaly detected");
        anomalies.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(bots: usize, seconds: u32) -> Cli {
        Cli {
            bots,
            seconds,
            seed: None,
            tick_rate: 30,
            food: 50,
        }
    }

    #[test]
    fn short_run_is_clean() {
        let summary = run_simulation(&cli(6, 5), 99).expect("simulation runs");
        assert_eq!(summary.ticks, 150);
        assert!(summary.anomalies.is_empty(), "{:?}", summary.anomalies);
        assert!(summary.largest_radius >= 50.0);
        assert!(summary.messages_sent > 0);
    }

    #[test]
    fn same_seed_same_outcome() {
        let first = run_simulation(&cli(4, 3), 7).expect("simulation runs");
        let second = run_simulation(&cli(4, 3), 7).expect("simulation runs");
        assert_eq!(first.eliminations, second.eliminations);
        assert_eq!(first.food_eaten, second.food_eaten);
        assert_eq!(first.largest_radius, second.largest_radius);
    }

    #[test]
    fn push_anomaly_deduplicates_messages() {
        let mut anomalies = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut seen, 1, "same".to_string());
        push_anomaly(&mut anomalies, &mut seen, 2, "same".to_string());
        assert_eq!(anomalies, vec!["same".to_string()]);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let mut options = cli(2, 1);
        options.tick_rate = 0;
        assert!(run_simulation(&options, 1).is_err());
    }
}
