use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skybridge::{Angle, SyncReply, TcpScriptHost, TelescopeBridge, Tracking};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "skybridge",
    about = "Drive a TheSkyX-controlled telescope over its scripting socket",
    version
)]
struct Args {
    /// Scripting host address
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Scripting host port
    #[arg(long, default_value_t = skybridge::DEFAULT_PORT)]
    port: u16,

    /// Seconds to wait for a reply (slews and syncs can block for a while)
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the mount position and drive flags
    Status,
    /// Slew to an Az/Alt target and set tracking
    Slew {
        /// Target azimuth in decimal degrees
        #[arg(long)]
        az: Option<f64>,

        /// Target altitude in decimal degrees
        #[arg(long)]
        alt: Option<f64>,

        /// Tracking state after the slew; omit to leave the drive untouched
        #[arg(long)]
        track: Option<bool>,
    },
    /// Sync the mount on a known RA/Dec position
    Sync {
        /// Right ascension in the host's native format
        #[arg(long)]
        ra: String,

        /// Declination in the host's native format
        #[arg(long)]
        dec: String,
    },
    /// Disconnect the mount from the scripting host
    Disconnect,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let host = TcpScriptHost::new(&args.host, args.port)
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(args.timeout));
    let bridge = TelescopeBridge::with_host(host);

    match args.command {
        Command::Status => {
            let status = bridge.get_status().await.context("status query failed")?;
            println!(
                "az {:.2}  alt {:.2}  tracking {}  slew complete {}",
                status.azimuth, status.altitude, status.is_tracking, status.is_slew_complete
            );
        }
        Command::Slew { az, alt, track } => {
            let tracking = match track {
                Some(true) => Tracking::On,
                Some(false) => Tracking::Off,
                None => Tracking::Keep,
            };
            bridge
                .slew_and_track(az.map(Angle::from), alt.map(Angle::from), tracking)
                .await
                .context("slew failed")?;
            println!("slew accepted");
        }
        Command::Sync { ra, dec } => {
            match bridge.sync(ra, dec).await.context("sync failed")? {
                SyncReply::Completed => println!("sync completed"),
                SyncReply::Deferred(status) => println!(
                    "sync deferred  tracking {}  slew complete {}",
                    status.is_tracking, status.is_slew_complete
                ),
            }
        }
        Command::Disconnect => {
            bridge
                .disconnect_mount()
                .await
                .context("disconnect failed")?;
            println!("mount disconnected");
        }
    }

    Ok(())
}
