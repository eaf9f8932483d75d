//! barolog command-line entry point

use std::{
    process::ExitCode,
    sync::{atomic::AtomicBool, Arc},
};

use anyhow::Result;
use barolog_core::{CalibrationError, RunError};
use clap::Parser;

mod cli;
mod config;
mod logger;
mod run;
mod signal;

use cli::{Cli, Command};

/// Sensor gave up mid-run
const EXIT_SENSOR_LOST: u8 = 2;
/// No baseline could be established
const EXIT_CALIBRATION: u8 = 3;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));
    log::debug!("barolog {}", barolog_core::VERSION);

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn dispatch(command: Command) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    match command {
        Command::Simulate(args) => {
            signal::stop_on_ctrl_c(Arc::clone(&stop))?;
            run::simulate(&args, &stop)
        }
        Command::Replay(args) => {
            signal::stop_on_ctrl_c(Arc::clone(&stop))?;
            run::replay(&args, &stop)
        }
        Command::Summary(args) => run::summary(&args),
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RunError>() {
        Some(RunError::SensorLost { .. }) => EXIT_SENSOR_LOST,
        _ if err.downcast_ref::<CalibrationError>().is_some() => EXIT_CALIBRATION,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use barolog_core::{SensorFault, SinkError};

    #[test]
    fn exit_codes_follow_the_root_cause() {
        let lost: Result<()> = Err(RunError::SensorLost { consecutive_faults: 11, cycles: 40 }.into());
        assert_eq!(exit_code(&lost.context("acquisition stopped").unwrap_err()), EXIT_SENSOR_LOST);

        let calibration = anyhow::Error::from(CalibrationError::SensorFault {
            consecutive: 11,
            last: SensorFault::Disconnected,
        });
        assert_eq!(exit_code(&calibration), EXIT_CALIBRATION);

        let sink = anyhow::Error::from(RunError::Sink(SinkError::Closed));
        assert_eq!(exit_code(&sink), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("no rows")), 1);
    }
}
