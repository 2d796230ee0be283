//! barwidget-rs-cpu: CPU widget binary for the status bar.
//!
//! Emits one JSON object per refresh tick on stdout; diagnostics go to
//! stderr so the data channel stays clean.

use barwidget_rs_core::Widget;
use barwidget_rs_cpu::CpuWidget;
use clap::Parser;
use std::io::{self, Write};
use std::process;
use std::time::Duration;
use tokio::time;

/// Command-line arguments for the CPU widget.
#[derive(Parser)]
#[command(name = "barwidget-rs-cpu")]
#[command(about = "CPU widget for barwidget-rs")]
#[command(version)]
struct Args {
    /// Update interval in milliseconds
    #[arg(short, long, default_value = "1000")]
    interval: u64,

    /// One-shot mode (output once and exit)
    #[arg(short, long)]
    once: bool,

    /// Verify the kernel files are readable and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut widget = CpuWidget::new();

    if args.check {
        match widget.check_availability() {
            Ok(()) => {
                println!("CPU widget is available");
                return Ok(());
            }
            Err(e) => {
                eprintln!("CPU widget is not available: {}", e);
                process::exit(1);
            }
        }
    }

    if args.once {
        let output = widget.refresh()?;
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let mut interval = time::interval(Duration::from_millis(args.interval));

        loop {
            interval.tick().await;

            match widget.refresh() {
                Ok(output) => {
                    println!("{}", serde_json::to_string(&output)?);
                    io::stdout().flush()?;
                }
                Err(e) => {
                    eprintln!("Error reading CPU stats: {}", e);
                    // Keep running; each tick is an independent attempt.
                }
            }
        }
    }

    Ok(())
}
