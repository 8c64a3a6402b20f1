//! Example driving the pipeline the way a CPU simulator would: five
//! pipeline stages emitting duration slices per instruction, a counter
//! lane, and an occasional squash marker.
//!
//! Usage: simulate [-o trace.json] [-n 100]

use clap::Parser;
use eyre::{Context, Result};
use simtrace::{Collector, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "emit a synthetic cpu pipeline trace")]
struct Args {
    #[arg(short, long, default_value = "event.json", help = "output trace file")]
    output: PathBuf,

    #[arg(short = 'n', long, default_value_t = 100, help = "instructions to simulate")]
    instructions: u64,
}

const STAGE_LATENCY_US: u64 = 10;

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config {
        output: args.output.clone(),
        ..Config::default()
    };
    let (tracer, collector) =
        Collector::start(config).with_context(|| format!("failed to start collector output={}", args.output.display()))?;

    let stages = 5u32;
    for insn in 0..args.instructions {
        for stage in 0..stages {
            let ts = insn * STAGE_LATENCY_US + u64::from(stage) * STAGE_LATENCY_US;
            let name = format!("insn-{insn}");
            tracer.duration_begin(0, stage, &name, ts, 0);
            tracer.duration_end(0, stage, &name, ts + STAGE_LATENCY_US, 0);
        }
        tracer.counter(0, 0, "retired", (insn + 1) * STAGE_LATENCY_US, 0);

        // a mispredict squashes every tenth instruction
        if insn % 10 == 9 {
            tracer.instant(0, 0, "mispredict", insn * STAGE_LATENCY_US, 'p', 1);
        }
    }

    collector.stop()?;
    tracing::info!(output = %args.output.display(), "trace written");
    Ok(())
}
