mod app;
mod config;
mod error;
mod export;
mod graph;
mod ledger;
mod physics;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{ForceParams, LayoutVariant};
use crate::export::LayoutSnapshot;
use crate::ledger::{JsonExportSource, MAX_HISTORY, collect_wallet_graph};
use crate::physics::Simulation;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Wallet to center the graph on (`0x` + 40 hex digits).
    #[arg(long)]
    address: String,

    /// Block-explorer `txlist` export to read the history from. String
    /// values are whole wei (decimal or `0x` hex); JSON numbers are ETH.
    #[arg(long, default_value = "history.json")]
    history: PathBuf,

    /// Most recent transactions kept from the export.
    #[arg(long, default_value_t = MAX_HISTORY)]
    history_limit: usize,

    /// Overrides the layout from the force config.
    #[arg(long, value_enum)]
    layout: Option<LayoutVariant>,

    /// JSON file with force parameters.
    #[arg(long)]
    force_config: Option<PathBuf>,

    /// Run the layout without a window and print it as JSON.
    #[arg(long)]
    dump_layout: bool,

    #[arg(long, default_value_t = 1_000)]
    max_ticks: usize,

    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let default = if verbose {
        "flow_lens=debug"
    } else {
        "flow_lens=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_params(args: &Args) -> Result<ForceParams> {
    let mut params = match &args.force_config {
        Some(path) => ForceParams::load(path)?,
        None => ForceParams::default(),
    };
    if let Some(layout) = args.layout {
        params.layout = layout;
    }
    Ok(params)
}

fn dump_layout(args: &Args, params: ForceParams) -> Result<()> {
    let source = JsonExportSource::new(&args.history).with_limit(args.history_limit);
    let wallet = collect_wallet_graph(&args.address, &source)?;

    let mut simulation = Simulation::new(wallet.graph, params);
    let ticks = simulation.run_until_settled(args.max_ticks);
    if simulation.state().is_running() {
        tracing::warn!(ticks, "layout did not settle within --max-ticks");
    }

    let snapshot = LayoutSnapshot::capture(wallet.focus.as_str(), &simulation);
    let json = serde_json::to_string_pretty(&snapshot).context("failed to encode layout")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    let params = load_params(&args)?;

    if args.dump_layout {
        return dump_layout(&args, params);
    }

    let request = app::LoadRequest {
        address: args.address,
        history: args.history,
        history_limit: args.history_limit,
        params,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "flow-lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::FlowLensApp::new(cc, request)))),
    )
    .map_err(|error| anyhow!("failed to start the window: {error}"))
}
