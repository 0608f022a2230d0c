// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::sync::Arc;

use clap::Parser;
use mobot::{
    core::Alarm,
    driver::{CommandSink, SimDrive, UdpDrive},
    motion::Sequencer,
    runtime::RuntimeContext,
    service::{AlarmMonitor, GoalServer},
};

mod config;

#[derive(Parser)]
#[command(author = "Copyright (C) 2024 Laixer Equipment B.V.")]
#[command(version, propagate_version = true)]
#[command(about = "Mobot motion daemon", long_about = None)]
struct Args {
    /// Configuration file.
    #[arg(
        short = 'c',
        long = "config",
        alias = "conf",
        default_value = "/etc/mobot.conf",
        value_name = "FILE"
    )]
    config: std::path::PathBuf,
    /// Enable simulation mode.
    #[arg(long, default_value_t = false)]
    simulation: bool,
    /// Quiet output (no logging).
    #[arg(long)]
    quiet: bool,
    /// Daemonize the service.
    #[arg(short = 'D', long)]
    daemon: bool,
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut config: config::Config = mobot::from_file(args.config)?;

    if args.simulation {
        config.simulation.enabled = true;
    }

    let mut log_config = simplelog::ConfigBuilder::new();
    if args.daemon {
        log_config.set_time_level(LevelFilter::Off);
        log_config.set_thread_level(LevelFilter::Off);
    }

    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);
    log_config.add_filter_ignore_str("mio");

    let log_level = if args.daemon {
        LevelFilter::Info
    } else if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let color_choice = if args.daemon {
        simplelog::ColorChoice::Never
    } else {
        simplelog::ColorChoice::Auto
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        color_choice,
    )?;

    if args.daemon {
        log::debug!("Running service as daemon");
    }

    log::trace!("{:#?}", config);

    config.motion.validate()?;

    log::debug!("Starting motion services");
    log::info!(
        "Move speed: {} m/s; Spin speed: {} rad/s; Sample period: {} s",
        config.motion.move_speed,
        config.motion.spin_speed,
        config.motion.sample_dt
    );

    let sink: Box<dyn CommandSink> = if config.simulation.enabled {
        log::info!("Running in simulation mode");
        Box::new(SimDrive::new())
    } else {
        log::info!("Drive controller at: {}", config.drive.address);
        Box::new(UdpDrive::connect(&config.drive.address).await?)
    };

    let runtime = RuntimeContext::new();
    runtime.enable_term_shutdown();

    let monitor = AlarmMonitor::new(Alarm::new());

    let mut sequencer = Sequencer::new(config.motion.clone(), sink, monitor.alarm())
        .with_shutdown(runtime.shutdown_signal());

    log::debug!("Halting drive at startup");
    if let Err(e) = sequencer.halt().await {
        log::error!("Failed to halt drive: {}", e);
    }

    let sequencer = Arc::new(tokio::sync::Mutex::new(sequencer));

    let server = GoalServer::bind(config.server.clone(), sequencer.clone(), monitor).await?;

    runtime.spawn_background_task(server.run());

    runtime.wait_for_shutdown().await;

    log::debug!("Waiting for motion to settle");

    if let Err(e) = sequencer.lock().await.halt().await {
        log::error!("Failed to halt drive: {}", e);
    }

    log::debug!("{} was shutdown gracefully", env!("CARGO_BIN_NAME"));

    Ok(())
}
