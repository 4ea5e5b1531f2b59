use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;

use launchseq::midi::list_ports;
use launchseq::{Config, DeviceModel, MidiTransport, Sequencer, SystemClock};

#[derive(Parser)]
#[command(name = "launchseq")]
#[command(author, version, about = "Launchpad step sequencer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/launchseq/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller model (mini-mk3, x)
    #[arg(short, long)]
    device: Option<DeviceModel>,

    /// Substring of the controller's MIDI port name
    #[arg(long)]
    port: Option<String>,

    /// Starting tempo in bpm
    #[arg(long)]
    bpm: Option<u32>,

    /// Name of the virtual port drum triggers are sent to
    #[arg(long)]
    output_name: Option<String>,

    /// Send drum triggers to an existing port instead of a virtual one
    #[arg(long)]
    connect_to: Option<String>,

    /// Also play drum triggers on the default audio output
    #[cfg(feature = "audition")]
    #[arg(long)]
    audition: bool,

    /// Log every inbound message and sound trigger
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// List available MIDI ports
    ListPorts,
    /// List supported controller models
    ListDevices,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::ListPorts) => {
            let (inputs, outputs) = list_ports()?;
            println!("MIDI inputs:");
            for name in inputs {
                println!("  {}", name);
            }
            println!("MIDI outputs:");
            for name in outputs {
                println!("  {}", name);
            }
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            for model in DeviceModel::all() {
                println!(
                    "{:<10} {} (ports matching '{}')",
                    model.key(),
                    model.name(),
                    model.port_match()
                );
            }
            return Ok(());
        }
        None => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::load_or_default(),
    };

    // Apply CLI overrides
    if let Some(model) = cli.device {
        config.device.model = model;
    }
    if cli.port.is_some() {
        config.device.port = cli.port;
    }
    if let Some(bpm) = cli.bpm {
        config.tempo.default_bpm = bpm;
    }
    if let Some(name) = cli.output_name {
        config.output.port_name = name;
    }
    if cli.connect_to.is_some() {
        config.output.connect_to = cli.connect_to;
    }
    config.validate()?;

    #[cfg(feature = "audition")]
    let audition = cli.audition;
    #[cfg(not(feature = "audition"))]
    let audition = false;

    if let Err(e) = run(&config, audition) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg_attr(not(feature = "audition"), allow(unused_variables))]
fn run(config: &Config, audition: bool) -> Result<()> {
    // First signal asks the loop to stop, a second one exits right away
    let shutdown = Arc::new(AtomicBool::new(false));
    for &sig in TERM_SIGNALS {
        flag::register_conditional_shutdown(sig, 1, Arc::clone(&shutdown))?;
        flag::register(sig, Arc::clone(&shutdown))?;
    }

    #[cfg_attr(not(feature = "audition"), allow(unused_mut))]
    let mut transport = MidiTransport::open(&config.to_transport_options())
        .with_context(|| format!("cannot reach {}", config.device.model.name()))?;

    #[cfg(feature = "audition")]
    if audition {
        match launchseq::AudioOutput::new() {
            Ok(output) => transport.set_audition(output),
            Err(e) => log::warn!("Audition disabled: {}", e),
        }
    }

    let mut sequencer = Sequencer::new(
        transport,
        SystemClock::new(),
        config.to_sequencer_settings(),
    )
    .context("controller handshake failed")?;

    sequencer.run(&shutdown);
    Ok(())
}
