use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::sync::Arc;

use plotboard::config::ServerConfig;
use plotboard::device::{Device, OfflineEngine};
use plotboard::draw::{StrokeStyle, color};
use plotboard::server::NullTransport;

#[derive(Parser, Debug)]
#[command(name = "plotboard")]
#[command(version, about = "Live vector-graphics viewer device")]
struct Cli {
    /// Path to the config file (default: ~/.config/plotboard/config.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default page width, overrides the config file
    #[arg(long, value_name = "UNITS")]
    width: Option<f64>,

    /// Default page height, overrides the config file
    #[arg(long, value_name = "UNITS")]
    height: Option<f64>,

    /// Record a demo page set and print page 0 as SVG (self-check)
    #[arg(long, action = ArgAction::SetTrue)]
    demo: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long, action = ArgAction::SetTrue)]
    show_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load()?,
    };
    if let Some(width) = cli.width {
        config.device.default_width = width;
    }
    if let Some(height) = cli.height {
        config.device.default_height = height;
    }
    log::info!(
        "config: {}:{}, default page {}x{}",
        config.server.host,
        config.server.port,
        config.device.default_width,
        config.device.default_height
    );

    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if cli.demo {
        return demo(config);
    }

    println!("plotboard: live vector-graphics viewer device");
    println!();
    println!("Usage:");
    println!("  plotboard --demo           Record a demo page set and print page 0 as SVG");
    println!("  plotboard --show-config    Print the resolved configuration");
    println!("  plotboard --help           Show help");
    Ok(())
}

/// Records two pages through the callback surface and prints page 0,
/// exercising the store, the replay dance and the serializer end to end.
fn demo(config: ServerConfig) -> anyhow::Result<()> {
    let width = config.device.default_width;
    let height = config.device.default_height;
    let mut engine = OfflineEngine::new(width, height);
    let mut device = Device::new(Arc::new(config), NullTransport::new());

    let style = StrokeStyle::new(color::BLACK, color::TRANSPARENT, 2.0);
    device.new_page(&mut engine, color::WHITE);
    device.line(0.0, 0.0, width / 2.0, height / 2.0, style);
    device.circle(width / 2.0, height / 2.0, height / 4.0, style);

    device.new_page(&mut engine, color::WHITE);
    device.rect(10.0, 10.0, width - 10.0, height - 10.0, style);

    // Serving page 0 while page 1 is live exercises the replay dance.
    let svg = device
        .svg(&mut engine, Some(0), width, height)
        .map_err(|err| anyhow::anyhow!("demo render failed: {err}"))?;
    print!("{svg}");
    log::info!(
        "recorded {} pages, update counter {}",
        device.page_count(),
        device.upid()
    );
    Ok(())
}
