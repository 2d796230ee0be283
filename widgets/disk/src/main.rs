//! barwidget-rs-disk: free-disk-space widget binary for the status bar.

use barwidget_rs_core::Widget;
use barwidget_rs_disk::DiskWidget;
use clap::Parser;
use std::io::{self, Write};
use std::process;
use std::time::Duration;
use tokio::time;

/// Command-line arguments for the disk widget.
#[derive(Parser)]
#[command(name = "barwidget-rs-disk")]
#[command(about = "Free-disk-space widget for barwidget-rs")]
#[command(version)]
struct Args {
    /// Mount path to report free space for
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Update interval in milliseconds
    #[arg(short, long, default_value = "1000")]
    interval: u64,

    /// One-shot mode (output once and exit)
    #[arg(short, long)]
    once: bool,

    /// Verify the mount path is queryable and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut widget = DiskWidget::new(&args.path);

    if args.check {
        match widget.check_availability() {
            Ok(()) => {
                println!("Disk widget is available for {}", args.path);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Disk widget is not available: {}", e);
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
                    eprintln!("Error reading disk stats: {}", e);
                }
            }
        }
    }

    Ok(())
}
