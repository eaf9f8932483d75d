//! File sink, log reader and replay against real runs on disk

mod common;

use core::sync::atomic::AtomicBool;
use std::fs;

use barolog_core::{
    sink::{unique_log_path, FileSink, LogFormat, LogReader, MemorySink},
    source::{FlightProfile, FlightProfileSource, ReplaySource, ScriptedSource},
    time::ManualClock,
    AcquisitionConfig, AcquisitionLoop, Anomaly, CalibrationConfig, Calibrator, FlightStats,
    LogSink, RunSummary,
};
use common::{assert_entries_close, baseline_at};

fn profile() -> FlightProfile {
    FlightProfile::default()
        .with_apogee_m(150.0)
        .with_fault_rate(0.05)
        .with_seed(42)
}

/// Calibrate and fly the test profile into `sink`
fn fly<K: LogSink>(sink: &mut K) -> RunSummary {
    let clock = ManualClock::new(0);
    let mut source = FlightProfileSource::with_profile(clock.clone(), profile());
    let baseline = Calibrator::new(CalibrationConfig::default())
        .calibrate(&mut source, &clock)
        .unwrap();
    let stop = AtomicBool::new(false);

    AcquisitionLoop::new(AcquisitionConfig::default())
        .run(&mut source, &baseline, sink, &clock, &stop)
        .unwrap()
}

fn round_trip(format: LogFormat) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("flight.{}", format.extension()));

    let mut file_sink = FileSink::create(&path, format).unwrap();
    let summary = fly(&mut file_sink);
    file_sink.close().unwrap();

    let mut memory = MemorySink::new();
    fly(&mut memory);

    let mut reader = LogReader::open(&path).unwrap();
    assert_eq!(reader.format(), format);
    let rows = reader.read_all().unwrap();

    assert_eq!(rows.len() as u64, summary.cycles);
    assert_eq!(reader.stats().parse_errors, 0);
    assert_entries_close(&rows, memory.entries());

    let anomalies = rows.iter().filter(|r| r.anomaly_flag.is_anomaly()).count();
    assert_eq!(anomalies as u64, summary.anomaly_count);
    assert!(anomalies > 0, "fault injection should show up in the log");
}

/// A NaN glitch row must survive the file, it is the anomaly the log keeps
fn glitch_round_trip(format: LogFormat) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("glitch.{}", format.extension()));
    let stop = AtomicBool::new(false);

    let mut file_sink = FileSink::create(&path, format).unwrap();
    let mut source = ScriptedSource::new().samples([1001.0, f64::NAN, 1000.0]);
    let summary = AcquisitionLoop::new(AcquisitionConfig::default())
        .run(&mut source, &baseline_at(1001.0), &mut file_sink, &ManualClock::new(0), &stop)
        .unwrap();
    file_sink.close().unwrap();

    let mut memory = MemorySink::new();
    let mut source = ScriptedSource::new().samples([1001.0, f64::NAN, 1000.0]);
    AcquisitionLoop::new(AcquisitionConfig::default())
        .run(&mut source, &baseline_at(1001.0), &mut memory, &ManualClock::new(0), &stop)
        .unwrap();

    let mut reader = LogReader::open(&path).unwrap();
    let rows = reader.read_all().unwrap();
    assert_eq!(summary.cycles, 3);
    assert_eq!(reader.stats().rows_read, 3);
    assert_eq!(reader.stats().parse_errors, 0);
    assert_entries_close(&rows, memory.entries());

    assert_eq!(rows[1].anomaly_flag, Anomaly::InvalidPressure);
    assert!(rows[1].pressure_hpa.is_nan());
    assert_eq!(FlightStats::from_entries(&rows).unwrap().anomaly_count, 1);
}

#[test]
fn csv_round_trip() {
    round_trip(LogFormat::Csv);
    glitch_round_trip(LogFormat::Csv);
}

#[test]
fn json_lines_round_trip() {
    round_trip(LogFormat::JsonLines);
    glitch_round_trip(LogFormat::JsonLines);
}

#[test]
fn replay_reproduces_altitudes() {
    let mut original = MemorySink::new();
    fly(&mut original);

    let mut source = ReplaySource::from_entries(original.entries().to_vec());
    let baseline = source.recorded_baseline().unwrap();
    let period = source.period_hint_ms().unwrap();
    let sea_level = source.recorded_sea_level_hpa().unwrap();

    let clock = ManualClock::new(0);
    let stop = AtomicBool::new(false);
    let mut replayed = MemorySink::new();
    let summary = AcquisitionLoop::new(
        AcquisitionConfig::default()
            .with_period_ms(period)
            .with_sea_level_hpa(sea_level),
    )
    .run(&mut source, &baseline, &mut replayed, &clock, &stop)
    .unwrap();

    assert_eq!(summary.cycles as usize, original.len());
    for (a, b) in replayed.entries().iter().zip(original.entries()) {
        assert_eq!(a.anomaly_flag, b.anomaly_flag);
        assert_eq!(a.pressure_hpa, b.pressure_hpa);
        assert_eq!(a.relative_altitude_m, b.relative_altitude_m);
        assert_eq!(a.absolute_filtered_m, b.absolute_filtered_m);
    }
}

#[test]
fn stats_from_written_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight.csv");

    let mut sink = FileSink::create(&path, LogFormat::Csv).unwrap();
    let summary = fly(&mut sink);
    sink.close().unwrap();

    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("this line is not a row\n");
    fs::write(&path, text).unwrap();

    let mut reader = LogReader::open(&path).unwrap();
    let rows = reader.read_all().unwrap();
    let stats = FlightStats::from_entries(&rows)
        .unwrap()
        .with_parse_errors(reader.stats().parse_errors);

    assert_eq!(stats.rows as u64, summary.cycles);
    assert_eq!(stats.parse_errors, 1);
    assert_eq!(stats.anomaly_count as u64, summary.anomaly_count);
    assert!((stats.apogee_m - 150.0).abs() < 3.0, "apogee {}", stats.apogee_m);
    assert!(stats.max_accel_g > 3.0);
    assert!(stats.pressure_min_hpa < stats.pressure_max_hpa);
}

#[test]
fn unique_log_path_skips_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("DATA");

    let first = unique_log_path(&data, "17-10-2026", "csv").unwrap();
    assert!(data.is_dir());
    assert_eq!(first.file_name().unwrap(), "17-10-2026_(log 1).csv");

    fs::write(&first, "").unwrap();
    fs::write(data.join("17-10-2026_(log 2).csv"), "").unwrap();

    let third = unique_log_path(&data, "17-10-2026", "csv").unwrap();
    assert_eq!(third.file_name().unwrap(), "17-10-2026_(log 3).csv");

    // Other extensions do not collide
    let json = unique_log_path(&data, "17-10-2026", "jsonl").unwrap();
    assert_eq!(json.file_name().unwrap(), "17-10-2026_(log 1).jsonl");
}

#[test]
fn missing_humidity_round_trips_as_empty_cell() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.csv");

    let clock = ManualClock::new(0);
    let mut source = ScriptedSource::new().samples([1001.0, 0.0, 1000.0]);
    let mut sink = FileSink::create(&path, LogFormat::Csv).unwrap();
    let stop = AtomicBool::new(false);
    AcquisitionLoop::new(AcquisitionConfig::default())
        .run(&mut source, &baseline_at(1001.0), &mut sink, &clock, &stop)
        .unwrap();
    sink.close().unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.lines().nth(1).unwrap().contains(",,"));

    let rows = LogReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.humidity_pct.is_none()));
    assert_eq!(rows[1].anomaly_flag, Anomaly::InvalidPressure);
}
