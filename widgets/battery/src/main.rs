//! barwidget-rs-battery: battery charge widget binary for the status bar.

use barwidget_rs_battery::BatteryWidget;
use barwidget_rs_core::Widget;
use clap::Parser;
use std::io::{self, Write};
use std::process;
use std::time::Duration;
use tokio::time;

/// Command-line arguments for the battery widget.
#[derive(Parser)]
#[command(name = "barwidget-rs-battery")]
#[command(about = "Battery charge widget for barwidget-rs")]
#[command(version)]
struct Args {
    /// Power-supply device name under /sys/class/power_supply
    #[arg(short, long, default_value = "BAT0")]
    battery: String,

    /// Update interval in milliseconds
    #[arg(short, long, default_value = "5000")]
    interval: u64,

    /// One-shot mode (output once and exit)
    #[arg(short, long)]
    once: bool,

    /// Verify the power-supply device exists and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut widget = BatteryWidget::new(&args.battery);

    if args.check {
        match widget.check_availability() {
            Ok(()) => {
                println!("Battery widget is available for {}", args.battery);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Battery widget is not available: {}", e);
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
                    eprintln!("Error reading battery stats: {}", e);
                }
            }
        }
    }

    Ok(())
}
