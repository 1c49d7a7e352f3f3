//! MuseDAC+ LED Strip Driver CLI
//!
//! A thin shell over the driver library: opens the transport, then either
//! runs the interactive command loop or fires a single command.

use std::sync::Arc;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing::info;

use musedacled::{LedDriver, DRIVER_NAME};
use musedacled_transport::{BoxedTransport, MemoryTransport, SpiDevTransport};

mod cli;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("musedacled=info".parse()?),
        )
        .init();

    let transport: BoxedTransport = if cli.dry_run {
        info!("dry run: frames are captured, not written");
        Arc::new(MemoryTransport::new())
    } else {
        Arc::new(SpiDevTransport::open(&cli.device)?)
    };

    info!(
        device = %transport.device_info().device_path,
        "{DRIVER_NAME} v{}",
        env!("CARGO_PKG_VERSION")
    );

    let driver = LedDriver::new(transport);

    match cli.command {
        None | Some(Commands::Run) => run_loop(&driver).await?,
        Some(Commands::Color { spec }) => {
            driver
                .handle_line(&format!("color {}", spec.join(" ")))
                .await?;
        }
        Some(Commands::Status) => {
            println!("{}", driver.status_report());
        }
    }

    driver.engine().stop().await;
    Ok(())
}

/// Read command lines from stdin until EOF or Ctrl-C
async fn run_loop(driver: &LedDriver) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{DRIVER_NAME} v{} — color/anim/stop/status, Ctrl-C to quit",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                match line? {
                    None => break,
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match driver.handle_line(&line).await {
                        Ok(Some(text)) => println!("{text}"),
                        Ok(None) => {}
                        Err(e) => eprintln!("error: {e}"),
                    },
                }
            }
        }
    }

    Ok(())
}
