//! AxisGuard Benchmark Example
//!
//! Runs the built-in circular-sweep benchmark on the system clock and prints
//! the report. Build with `--release`; debug builds routinely miss the
//! 100µs budget.

use axisguard_ml::{InputProcessor, ProcessorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1000);

    let mut processor = InputProcessor::new(ProcessorConfig::default())?;
    let report = processor.run_benchmark(frames);

    println!("{}", report);
    println!(
        "Neural inference within target: {}",
        if report.inference_within_target() { "yes" } else { "no" }
    );

    if processor.safety().performance_budget_exceeded {
        println!("Budget breaker tripped; statistical path only for the rest of the run.");
    }

    println!("\n{}", processor.diagnostics());
    Ok(())
}
