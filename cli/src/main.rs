use charbuf::{DeviceConfig, DevicePair, INPUT_DEVICE_NAME, OUTPUT_DEVICE_NAME};
use clap::Parser;
use cli::{pump, DEFAULT_CHUNK};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};

/// Pump stdin to stdout through a 1024-byte shared buffer
#[derive(Parser, Debug)]
#[command(name = "charbuf", version)]
struct Args {
    /// Bytes requested per read from stdin and per drain
    #[arg(short, long, default_value_t = DEFAULT_CHUNK)]
    chunk: usize,

    /// Name of the input endpoint in log output
    #[arg(long, default_value = INPUT_DEVICE_NAME)]
    input_name: String,

    /// Name of the output endpoint in log output
    #[arg(long, default_value = OUTPUT_DEVICE_NAME)]
    output_name: String,
}

fn main() -> ExitCode {
    // Logs go to stderr so they never mix with the pumped bytes
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let pair = DevicePair::new(DeviceConfig {
        input_name: args.input_name,
        output_name: args.output_name,
    });

    match pump(&pair, args.chunk, io::stdin(), io::stdout()) {
        Ok(stats) => {
            info!(bytes = stats.bytes_out, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "pump failed");
            ExitCode::FAILURE
        }
    }
}
