//! Subcommand implementations

use std::{
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

use anyhow::{Context, Result};
use barolog_core::{
    sink::{unique_log_path, FileSink, LogReader},
    source::{FlightProfileSource, ReplaySource},
    time::{ManualClock, MonotonicClock},
    AcquisitionLoop, CalibrationBaseline, Calibrator, Clock, FlightStats, LogSink, RunSummary,
    SensorSource,
};

use crate::{
    cli::{ReplayArgs, SimulateArgs, SummaryArgs},
    config::{LoggerConfig, OutputConfig},
};

/// Calibrate against a simulated flight, then log it
pub fn simulate(args: &SimulateArgs, stop: &AtomicBool) -> Result<()> {
    let mut config = LoggerConfig::load(args.output.config.as_deref())?;
    config.apply(&args.output);
    if let Some(apogee_m) = args.apogee_m {
        config.flight = config.flight.with_apogee_m(apogee_m);
    }
    if let Some(fault_rate) = args.fault_rate {
        config.flight = config.flight.with_fault_rate(fault_rate);
    }
    if let Some(seed) = args.seed {
        config.flight = config.flight.with_seed(seed);
    }

    let stem = dated_stem();
    if args.realtime {
        simulate_with(MonotonicClock::new(), &config, &stem, stop)
    } else {
        simulate_with(ManualClock::new(0), &config, &stem, stop)
    }
}

fn simulate_with<C: Clock + Clone>(
    clock: C,
    config: &LoggerConfig,
    stem: &str,
    stop: &AtomicBool,
) -> Result<()> {
    let mut source = FlightProfileSource::with_profile(clock.clone(), config.flight);
    log::info!(
        "Simulating a {:.0} m flight ({:.1} s)",
        config.flight.apogee_m,
        config.flight.flight_time_ms() as f64 / 1000.0
    );

    let baseline = Calibrator::new(config.calibration)
        .calibrate(&mut source, &clock)
        .context("calibration failed")?;
    report_baseline(&baseline);

    record(&mut source, &baseline, config, stem, &clock, stop)
}

/// Run a recorded log back through the pipeline into a new log
pub fn replay(args: &ReplayArgs, stop: &AtomicBool) -> Result<()> {
    let mut config = LoggerConfig::load(args.output.config.as_deref())?;
    let mut source = ReplaySource::open(&args.log)
        .with_context(|| format!("reading {}", args.log.display()))?
        .with_faults(!args.ignore_faults);
    log::info!("Replaying {} rows from {}", source.len(), args.log.display());

    // Recorded values are the defaults, explicit flags still win
    if let Some(sea_level_hpa) = source.recorded_sea_level_hpa() {
        config.acquisition = config.acquisition.with_sea_level_hpa(sea_level_hpa);
    }
    if let Some(period_ms) = source.period_hint_ms() {
        config.acquisition = config.acquisition.with_period_ms(period_ms);
    }
    config.apply(&args.output);

    let clock = ManualClock::new(0);
    let baseline = if args.recorded_baseline {
        source
            .recorded_baseline()
            .with_context(|| format!("{} has no rows", args.log.display()))?
    } else {
        Calibrator::new(config.calibration)
            .calibrate(&mut source, &clock)
            .context("calibration failed")?
    };
    report_baseline(&baseline);

    let stem = replay_stem(&args.log);
    record(&mut source, &baseline, &config, &stem, &clock, stop)
}

/// Print statistics for a recorded log
pub fn summary(args: &SummaryArgs) -> Result<()> {
    let mut reader =
        LogReader::open(&args.log).with_context(|| format!("opening {}", args.log.display()))?;
    let entries = reader
        .read_all()
        .with_context(|| format!("reading {}", args.log.display()))?;
    let stats = FlightStats::from_entries(&entries)
        .with_context(|| format!("{} has no rows", args.log.display()))?
        .with_parse_errors(reader.stats().parse_errors);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

fn record<S: SensorSource, C: Clock>(
    source: &mut S,
    baseline: &CalibrationBaseline,
    config: &LoggerConfig,
    stem: &str,
    clock: &C,
    stop: &AtomicBool,
) -> Result<()> {
    let path = open_path(&config.output, stem)?;
    let mut sink = FileSink::create(&path, config.output.format)
        .with_context(|| format!("creating {}", path.display()))?
        .with_flush_every(config.output.flush_every);
    log::info!("Logging to {}", path.display());

    let outcome = AcquisitionLoop::new(config.acquisition).run(source, baseline, &mut sink, clock, stop);

    // The loop already flushed; closing releases the file on every path
    if let Err(err) = sink.close() {
        log::error!("Closing {} failed: {}", path.display(), err);
    }

    let summary = outcome.with_context(|| format!("acquisition stopped, partial log in {}", path.display()))?;
    report_summary(&summary, &path);
    Ok(())
}

fn open_path(output: &OutputConfig, stem: &str) -> Result<PathBuf> {
    unique_log_path(&output.dir, stem, output.format.extension())
        .with_context(|| format!("preparing log directory {}", output.dir.display()))
}

fn dated_stem() -> String {
    chrono::Local::now().format("%d-%m-%Y").to_string()
}

fn replay_stem(log: &Path) -> String {
    let stem = log.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
    format!("{}_replay", stem)
}

fn report_baseline(baseline: &CalibrationBaseline) {
    log::info!(
        "Baseline {:.2} hPa (std dev {:.3} hPa, {} samples, {} attempt(s)), {:.1} °C",
        baseline.baseline_pressure_hpa,
        baseline.std_dev_hpa,
        baseline.sample_count,
        baseline.attempts,
        baseline.temperature_c
    );
}

fn report_summary(summary: &RunSummary, path: &Path) {
    println!("Log:            {}", path.display());
    println!("Stop reason:    {:?}", summary.stop_reason);
    println!("Cycles:         {}", summary.cycles);
    println!("Duration:       {:.1} s", summary.duration_ms as f64 / 1000.0);
    println!(
        "Anomalies:      {} ({} sensor faults, {} invalid pressures)",
        summary.anomaly_count, summary.sensor_faults, summary.invalid_pressures
    );
    println!("Longest streak: {}", summary.max_consecutive_faults);
    println!("Overruns:       {}", summary.overruns);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_stem_keeps_the_original_name() {
        assert_eq!(replay_stem(Path::new("DATA/17-10-2026_(log 2).csv")), "17-10-2026_(log 2)_replay");
        assert_eq!(replay_stem(Path::new("")), "log_replay");
    }

    #[test]
    fn simulated_flight_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LoggerConfig::default();
        config.output.dir = dir.path().join("DATA");
        config.flight = config.flight.with_apogee_m(300.0);
        let stop = AtomicBool::new(false);

        simulate_with(ManualClock::new(0), &config, "flight", &stop).unwrap();
        let log = dir.path().join("DATA").join("flight_(log 1).csv");
        assert!(log.exists());

        let args = ReplayArgs {
            log: log.clone(),
            output: crate::cli::OutputArgs {
                out: Some(dir.path().join("replayed")),
                ..Default::default()
            },
            recorded_baseline: true,
            ignore_faults: false,
        };
        replay(&args, &stop).unwrap();

        let replayed = dir.path().join("replayed").join("flight_(log 1)_replay_(log 1).csv");
        let original = LogReader::open(&log).unwrap().read_all().unwrap();
        let again = LogReader::open(&replayed).unwrap().read_all().unwrap();
        assert_eq!(original.len(), again.len());

        let apogee = FlightStats::from_entries(&again).unwrap().apogee_m;
        assert!((apogee - 300.0).abs() < 5.0, "apogee {}", apogee);
    }

    #[test]
    fn dated_stem_is_day_month_year() {
        let stem = dated_stem();
        let parts: Vec<_> = stem.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }
}
