//! Risk calculation benchmarks
//!
//! The risk path sits on the quote hot path, so regressions here show up
//! directly in API latency.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use securepremium_common::types::telemetry::{
    DeviceMetrics, HistoricalBaseline, MetricBaseline, NetworkReputationSignal, TpmStatus,
};
use securepremium_risk::RiskCalculator;

fn full_metrics() -> DeviceMetrics {
    DeviceMetrics::new()
        .with_usage(42.0, 71.0)
        .with_logins(3, 250)
        .with_tpm_status(TpmStatus::Healthy)
        .with_timestamp(chrono::Utc::now())
        .with_anomaly_flag("port_scan")
}

fn baseline() -> HistoricalBaseline {
    HistoricalBaseline {
        cpu_usage: Some(MetricBaseline { mean: 38.0, stddev: 12.0 }),
        memory_usage: Some(MetricBaseline { mean: 64.0, stddev: 9.0 }),
        network_activity: Some(MetricBaseline { mean: 10.0, stddev: 4.0 }),
        disk_activity: Some(MetricBaseline { mean: 5.0, stddev: 2.0 }),
    }
}

fn bench_calculate_risk(c: &mut Criterion) {
    let calculator = RiskCalculator::new();
    let metrics = full_metrics();
    let history = baseline();
    let signal = NetworkReputationSignal {
        is_blacklisted: false,
        peer_average_risk: 0.2,
        is_vpn_detected: true,
    };

    let mut group = c.benchmark_group("risk");

    group.bench_function("calculate_minimal", |b| {
        let empty = DeviceMetrics::new();
        b.iter(|| calculator.calculate_risk(black_box("device_bench"), black_box(&empty), None, None));
    });

    group.bench_function("calculate_full", |b| {
        b.iter(|| {
            calculator.calculate_risk(
                black_box("device_bench"),
                black_box(&metrics),
                Some(black_box(&history)),
                Some(black_box(&signal)),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_calculate_risk);
criterion_main!(benches);
