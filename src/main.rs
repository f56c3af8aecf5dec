use clap::{Parser, Subcommand};
use log::{error, info};
use vbus_bridge::calibration::{calibrate, resolve_input, InputSource};
use vbus_bridge::constants::DEFAULT_LOG_LEVEL;
use vbus_bridge::logging::log_info;
use vbus_bridge::{init_logger, Bridge, BridgeConfig, MqttTransport};

#[derive(Parser)]
#[command(name = "vbus-bridge")]
#[command(about = "Decode RESOL VBUS payloads and republish temperatures over MQTT")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Subscribe to raw payloads and publish decoded temperatures
    Run {
        #[command(flatten)]
        config: BridgeConfig,
    },
    /// Search a payload for field offsets matching the known sample values
    Calibrate {
        /// Payload as hex; may be split across arguments. Defaults to the built-in sample.
        hex: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level);

    match cli.command {
        Commands::Run { config } => run(config).await,
        Commands::Calibrate { hex, json } => {
            let (payload, source) = resolve_input(&hex);
            // stdout stays pure JSON with --json
            match source {
                InputSource::Sample => eprintln!("Using built-in sample payload (from log)."),
                InputSource::Argument => {}
                InputSource::InvalidArgument(reason) => {
                    eprintln!("Invalid hex ({reason}). Using built-in sample payload.")
                }
            }

            let report = calibrate(&payload);
            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
            Ok(())
        }
    }
}

async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    let mut transport = match MqttTransport::connect(&config).await {
        Ok(transport) => transport,
        Err(e) => {
            error!("Cannot connect to MQTT broker {}: {e}", config.endpoint());
            std::process::exit(1);
        }
    };

    let mut bridge = Bridge::new(config.output_prefix.as_str());
    let interrupted = tokio::select! {
        result = bridge.run(&mut transport) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("Interrupted, shutting down");
        if let Err(e) = transport.disconnect().await {
            error!("Disconnect failed: {e}");
        }
    }

    log_info(&format!("Bridge stopped: {}", bridge.stats().to_json()?));
    Ok(())
}
