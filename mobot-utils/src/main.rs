// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use clap::Parser;
use mobot::{
    core::{AlarmSignal, ExecutionResult, Feedback, MotionGoal},
    protocol::{frame::Reject, Packetize},
};

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Mobot control utility", long_about = None)]
struct Args {
    /// Remote network address.
    #[arg(short = 'c', long = "connect", default_value = "127.0.0.1")]
    address: String,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Commands.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Submit a motion goal and wait for the result.
    Goal {
        /// Rotation in radians, once per step.
        #[arg(short, long = "angle", allow_negative_numbers = true)]
        angles: Vec<f64>,
        /// Translation in meters, once per step.
        #[arg(short, long = "distance", allow_negative_numbers = true)]
        distances: Vec<f64>,
    },
    /// Proximity alarm commands.
    Alarm {
        /// On or off.
        toggle: String,
    },
    /// Ping the server.
    Ping,
}

fn string_to_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "on" => Some(true),
        "true" => Some(true),
        "off" => Some(false),
        "false" => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bin_name = env!("CARGO_BIN_NAME").to_string();

    use log::LevelFilter;

    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(LevelFilter::Off);
    log_config.set_thread_level(LevelFilter::Off);
    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut address = args.address.clone();

    if !address.contains(':') {
        address.push(':');
        address.push_str(&mobot::consts::DEFAULT_NETWORK_PORT.to_string());
    }

    log::debug!("Waiting for connection to {}", address);

    let (mut client, latency) = mobot::protocol::client::ClientBuilder::new(
        address.to_owned(),
        format!("{}/{}", bin_name, mobot::consts::VERSION),
    )
    .command(matches!(args.command, Command::Goal { .. }))
    .sensor(matches!(args.command, Command::Alarm { .. }))
    .connect()
    .await?;

    log::info!("Connected to {} in {} ms", address, latency.as_millis());

    match args.command {
        Command::Goal { angles, distances } => {
            let goal = MotionGoal::new(angles, distances);

            log::info!("Submitting goal: {}", goal);

            client.send_packet(&goal).await?;

            loop {
                let frame = client.read_frame().await?;

                match frame.message {
                    Feedback::MESSAGE_TYPE => {
                        let feedback = client
                            .recv_packet::<Feedback>(frame.payload_length)
                            .await?;

                        log::info!("{}", feedback);
                    }
                    ExecutionResult::MESSAGE_TYPE => {
                        let result = client
                            .recv_packet::<ExecutionResult>(frame.payload_length)
                            .await?;

                        log::info!("Goal {}", result);

                        if !result.succeeded {
                            return Err(anyhow::anyhow!("Goal failed"));
                        }

                        break;
                    }
                    Reject::MESSAGE_TYPE => {
                        let reject = client
                            .recv_packet::<Reject>(frame.payload_length)
                            .await?;

                        return Err(anyhow::anyhow!("Goal rejected: {}", reject));
                    }
                    _ => {
                        log::error!("Unknown message type: 0x{:X}", frame.message);

                        client.discard(frame.payload_length).await?;
                    }
                }
            }
        }
        Command::Alarm { toggle } => {
            let toggle =
                string_to_bool(&toggle).ok_or_else(|| anyhow::anyhow!("Invalid value for alarm"))?;

            let signal = AlarmSignal::new(toggle);

            log::info!("Setting alarm: {}", if toggle { "on" } else { "off" });

            client.send_packet(&signal).await?;
        }
        Command::Ping => loop {
            let time_elapsed = client.probe().await?;

            log::info!("Echo response time: {} ms", time_elapsed.as_millis());

            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        },
    }

    client.send_shutdown().await?;

    Ok(())
}
