//! Shared memory vs. pipe report over several payload sizes.
//!
//! Unlike the `ipcbench` binary, which does one transfer across a fork, this
//! repeats in-process transfers and reports percentiles.
//!
//! Run with: cargo run --example benchmark_report --release

use ipcbench::core::PayloadGenerator;
use ipcbench_bench::transfer::{TransferStats, compare};
use std::time::Duration;

const ITERATIONS: usize = 10_000;
const PAYLOAD_SIZES: [usize; 5] = [64, 256, 1024, 8 * 1024, 60 * 1024];

fn format_latency(d: Duration) -> String {
    let ns = d.as_nanos() as f64;
    if ns >= 1000.0 {
        format!("{:.1} μs", ns / 1000.0)
    } else {
        format!("{:.0} ns", ns)
    }
}

fn print_row(channel: &str, stats: &TransferStats) {
    println!(
        "| {:>9} | {:<13} | {:>10} | {:>10} | {:>12.1} |",
        stats.payload_len,
        channel,
        format_latency(stats.latency.median),
        format_latency(stats.latency.p99),
        stats.mb_per_second()
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut generator = PayloadGenerator::seeded(0x1bc);

    println!("| {:>9} | {:<13} | {:>10} | {:>10} | {:>12} |", "bytes", "channel", "p50", "p99", "MB/s");
    println!("|{:-<11}|{:-<15}|{:-<12}|{:-<12}|{:-<14}|", "", "", "", "", "");

    for size in PAYLOAD_SIZES {
        let payload = generator.generate(size);
        let (shared, piped, comparison) = compare(&payload, ITERATIONS)?;
        print_row("shared memory", &shared);
        print_row("pipe", &piped);
        println!("|{:>11}| {:<70} |", "", comparison.verdict());
    }

    Ok(())
}
