//! Synthetic telemetry soak run for the sentinel limit engine.
//!
//! Feeds randomized power and thermal packets through the engine over a
//! channel-backed bus, running maintenance ticks and actionpoint
//! sampling on a fixed cadence, then dumps the housekeeping report.
//!
//! Usage:
//!   limits_sim --messages 500 --exceed-fraction 0.2
//!   limits_sim --table-dir ~/.sentinel_tables --resume

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::unbounded;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use sentinel::{Engine, EngineMode, SAMPLE_ALL};
use sentinel_harness::table_store::TableStore;
use sentinel_harness::{any_failed, demo, ChannelBus, ChannelRequester};

#[derive(Parser, Debug)]
#[command(about = "Soak the limit engine with synthetic telemetry")]
struct Args {
    /// Number of telemetry messages to generate
    #[arg(long, default_value_t = 500)]
    messages: u32,

    /// Run maintenance and sample every N messages
    #[arg(long, default_value_t = 8)]
    sample_every: u32,

    /// Fraction of packets carrying an out-of-limit value
    #[arg(long, default_value_t = 0.15)]
    exceed_fraction: f64,

    /// RNG seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Load/save tables and snapshots under this directory
    /// (missing tables are seeded with the demo set)
    #[arg(long)]
    table_dir: Option<PathBuf>,

    /// Resume from a previously saved snapshot if one exists
    #[arg(long, default_value_t = false)]
    resume: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = args.table_dir.clone().map(TableStore::new);
    let (watchpoints, actionpoints) = match &store {
        Some(store) => match (store.get_watchpoints(), store.get_actionpoints()) {
            (Some(watchpoints), Some(actionpoints)) => (
                watchpoints.context("loading watchpoint table")?,
                actionpoints.context("loading actionpoint table")?,
            ),
            _ => {
                info!("seeding {} with demo tables", store.root_path().display());
                let (watchpoints, actionpoints) = demo::tables();
                store.save_watchpoints(&watchpoints)?;
                store.save_actionpoints(&actionpoints)?;
                (watchpoints, actionpoints)
            }
        },
        None => demo::tables(),
    };

    let (subscribe_tx, subscribe_rx) = unbounded();
    let (request_tx, request_rx) = unbounded();

    let mut engine = Engine::new(EngineMode::Active)
        .with_bus(Box::new(ChannelBus::new(subscribe_tx)))
        .with_requester(Box::new(ChannelRequester::new(request_tx)));
    engine.load_tables(watchpoints, actionpoints)?;

    if args.resume {
        match store.as_ref().and_then(|store| store.get_snapshot()) {
            Some(Ok(snapshot)) => {
                if let Err(err) = engine.restore(snapshot) {
                    warn!("snapshot not restored: {err}");
                }
            }
            Some(Err(err)) => warn!("snapshot not restored: {err}"),
            None => {}
        }
    }

    let subscribed: Vec<u16> = subscribe_rx.try_iter().collect();
    info!("subscribed to {} message ids", subscribed.len());

    let mut rng = StdRng::seed_from_u64(args.seed);
    for n in 0..args.messages {
        let msg_id = *subscribed
            .choose(&mut rng)
            .context("no message ids subscribed")?;
        let exceed = rng.gen_bool(args.exceed_fraction);
        let payload = synthesize(msg_id, exceed, &mut rng);
        engine.dispatch_message(msg_id, &payload, u64::from(n));

        if (n + 1) % args.sample_every == 0 {
            engine.run_maintenance_tick();
            engine.sample_actionpoints(SAMPLE_ALL, 0, false)?;
        }
    }

    for rts_id in request_rx.try_iter() {
        info!("corrective sequence {rts_id} was requested");
    }

    let failing = any_failed(
        (0..engine.actionpoint_count())
            .filter_map(|slot| engine.actionpoint(slot as u16))
            .map(|rec| rec.action_result),
    );
    if failing {
        warn!("run ended with at least one actionpoint failing");
    }

    if let Some(store) = &store {
        if let Err(err) = store.save_snapshot(&engine.snapshot()) {
            warn!("snapshot not persisted: {err}");
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.housekeeping())?);
    Ok(())
}

/// Build a packet for `msg_id`, nominal or deliberately out of limit.
fn synthesize(msg_id: u16, exceed: bool, rng: &mut StdRng) -> Vec<u8> {
    match msg_id {
        demo::MSG_POWER => {
            let voltage = if exceed {
                rng.gen_range(32.5..36.0)
            } else {
                rng.gen_range(26.0..31.0)
            };
            let current = if exceed {
                rng.gen_range(1500..2200)
            } else {
                rng.gen_range(200..1200)
            };
            demo::power_packet(voltage, current)
        }
        _ => {
            let decidegrees = if exceed {
                *[-400, 700].choose(rng).unwrap_or(&700)
            } else {
                rng.gen_range(-100..400)
            };
            demo::thermal_packet(decidegrees)
        }
    }
}
