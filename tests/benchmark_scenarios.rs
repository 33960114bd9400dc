//! End-to-end runs of the benchmark engine at test-friendly sizes.

use std::time::Duration;

use lock_bench::{
    AffinityBinder, AffinityError, BenchError, BenchmarkConfig, CoreAffinityBinder, LockKind,
    NoAffinity, RunResult, run_benchmark, utils::export::ReportWriter,
};

fn scaled(num_workers: usize, kind: LockKind, iterations: u64) -> BenchmarkConfig {
    BenchmarkConfig::new(num_workers, kind)
        .with_iterations(iterations)
        .with_warmup_iterations(50)
        .with_barrier_timeout(Some(Duration::from_secs(60)))
}

fn collect(config: &BenchmarkConfig, binder: &dyn AffinityBinder) -> Vec<RunResult> {
    run_benchmark(config, binder, |_| Ok(())).expect("benchmark run failed")
}

fn assert_valid(config: &BenchmarkConfig, results: &[RunResult]) {
    assert_eq!(results.len(), config.num_runs);
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.run, i + 1);
        assert_eq!(r.threads, config.num_workers);
        assert_eq!(r.lock_type, config.lock_kind.label());
        assert_eq!(r.final_counter, config.total_ops());
        assert!(r.elapsed_seconds > 0.0);
        assert!(r.ops_per_second.is_finite() && r.ops_per_second > 0.0);
        let expected = config.total_ops() as f64 / r.elapsed_seconds;
        assert!((r.ops_per_second - expected).abs() <= expected * 1e-9);
    }
}

#[test]
fn four_workers_reentrant_without_work() {
    let config = scaled(4, LockKind::Reentrant, 1_000).with_max_work_nanos(0);
    let results = collect(&config, &NoAffinity);
    assert_valid(&config, &results);
    assert!(results.iter().all(|r| r.final_counter == 4_000));
}

#[test]
fn single_worker_monitor_single_iteration_unsupported_affinity() {
    let config = scaled(1, LockKind::Monitor, 1);
    let results = collect(&config, &NoAffinity);
    assert_valid(&config, &results);
    assert!(results.iter().all(|r| r.final_counter == 1));
}

#[test]
fn counter_invariant_holds_as_workers_increase() {
    for kind in [LockKind::Reentrant, LockKind::Monitor] {
        for workers in [1, 2, 4, 8] {
            let config = scaled(workers, kind, 500).with_num_runs(2);
            let results = collect(&config, &NoAffinity);
            assert_valid(&config, &results);
        }
    }
}

#[test]
fn repeated_executions_stay_correct() {
    let config = scaled(3, LockKind::Monitor, 300).with_num_runs(2);
    for _ in 0..5 {
        let results = collect(&config, &NoAffinity);
        assert_valid(&config, &results);
    }
}

#[test]
fn single_worker_throughput_tracks_per_iteration_cost() {
    // Spin cost dominates: average 50µs per iteration.
    let config = scaled(1, LockKind::Reentrant, 200)
        .with_num_runs(1)
        .with_max_work_nanos(100_000);
    let results = collect(&config, &NoAffinity);
    assert_valid(&config, &results);
    let per_iteration = results[0].elapsed_seconds / 200.0;
    assert!(per_iteration > 20e-6, "per-iteration cost {}s too small", per_iteration);
    assert!((results[0].ops_per_second - 1.0 / per_iteration).abs() <= results[0].ops_per_second * 1e-9);
}

#[test]
fn detected_affinity_never_aborts_the_run() {
    let binder = CoreAffinityBinder::detect();
    let config = scaled(2, LockKind::Reentrant, 200).with_num_runs(1);
    let results = collect(&config, &binder);
    assert_valid(&config, &results);
}

#[test]
fn failing_binder_is_advisory() {
    struct AlwaysFails;
    impl AffinityBinder for AlwaysFails {
        fn bind(&self, core_index: usize) -> Result<(), AffinityError> {
            Err(AffinityError::Failed { core: core_index })
        }
    }

    let config = scaled(2, LockKind::Monitor, 100).with_num_runs(1);
    let results = collect(&config, &AlwaysFails);
    assert_valid(&config, &results);
}

#[test]
fn zero_workers_is_a_configuration_error() {
    let config = scaled(0, LockKind::Reentrant, 10);
    let err = run_benchmark(&config, &NoAffinity, |_| Ok(())).unwrap_err();
    assert!(matches!(err, BenchError::Config(_)));
}

#[test]
fn csv_report_has_header_and_one_row_per_run() {
    let config = scaled(2, LockKind::Monitor, 100).with_num_runs(3);
    let mut report = ReportWriter::new(Vec::new());
    report.write_header().unwrap();
    run_benchmark(&config, &NoAffinity, |r| report.write_result(r)).unwrap();
    let out = String::from_utf8(report.into_inner().unwrap()).unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "run,threads,lock_type,elapsed_seconds,ops_per_second,final_counter"
    );
    for (i, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], (i + 1).to_string());
        assert_eq!(fields[1], "2");
        assert_eq!(fields[2], "monitor");
        assert_eq!(fields[3].split('.').nth(1).map(str::len), Some(6));
        assert_eq!(fields[4].split('.').nth(1).map(str::len), Some(6));
        assert_eq!(fields[5], "200");
    }
}
