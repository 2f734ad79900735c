pub mod data;
pub mod ledger;

use std::path::PathBuf;

use backevent::{commission::TieredCommission, queue::EventQueue};
use clap::Parser;
use data::{load_fill_records_from_csv, load_schedule_from_json};
use ledger::FeeLedger;
use log::{error, info, warn};

/// Prices broker commissions for a CSV of fills.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV with columns timeindex,symbol,exchange,quantity,direction,fill_cost[,commission]
    fills: PathBuf,

    /// JSON commission schedule; missing keys keep the default rates
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Print every fill event and then the summary as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let schedule = match &args.schedule {
        Some(path) => load_schedule_from_json(path)?,
        None => TieredCommission::default(),
    };
    info!("commission schedule: {:?}", schedule);

    let records = load_fill_records_from_csv(&args.fills)?;

    let mut q = EventQueue::new();
    if args.json {
        q.add_event_hook(|evt| match serde_json::to_string(evt) {
            Ok(s) => println!("{}", s),
            Err(err) => error!("encode {} event fail: {}", evt.kind(), err),
        });
    }

    for record in records {
        let sym = record.symbol.clone();
        match record.into_event_with(&schedule) {
            Ok(fill) => q.push(fill),
            Err(err) => warn!("invalid fill for {:?}: {}", sym, err),
        }
    }

    let mut ledger = FeeLedger::default();
    let n = q.drain_into(&mut ledger);
    info!("processed {} fills from {}", n, args.fills.display());

    let summary = ledger.summary();
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        summary.printstd();
    }
    Ok(())
}
