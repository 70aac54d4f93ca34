//! Flag Table Parsing Benchmarks
//!
//! Measures the pure token-validation paths a configuration-heavy caller
//! hits on every context setup: verify flags, protocol options, session
//! cache mode arguments, and protocol method lookup.
//!
//! Run with: cargo bench --bench flag_parsing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tlsctx::context::{
    CacheModeArg, Method, ProtocolOptions, SessionCacheMode, VerifyFlags,
};

fn bench_verify_flag_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify_flags");

    group.bench_function("parse_single", |b| {
        b.iter(|| VerifyFlags::parse(black_box(&["peer"])).unwrap());
    });

    group.bench_function("parse_full_set", |b| {
        b.iter(|| {
            VerifyFlags::parse(black_box(&[
                "none",
                "peer",
                "client_once",
                "fail_if_no_peer_cert",
            ]))
            .unwrap()
        });
    });

    group.bench_function("parse_rejects_unknown", |b| {
        b.iter(|| VerifyFlags::parse(black_box(&["peer", "bogus"])).unwrap_err());
    });

    group.finish();
}

fn bench_protocol_option_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("protocol_options");

    group.bench_function("parse_typical_server_set", |b| {
        b.iter(|| {
            ProtocolOptions::parse(black_box(&[
                "all",
                "no_compression",
                "no_ticket",
                "cipher_server_preference",
            ]))
            .unwrap()
        });
    });

    // worst case: last entry of the table on every lookup
    group.bench_function("parse_table_tail", |b| {
        b.iter(|| {
            ProtocolOptions::parse(black_box(&["allow_unsafe_legacy_renegotiation"]))
                .unwrap()
        });
    });

    group.finish();
}

fn bench_cache_mode_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_cache_mode");

    group.bench_function("parse_mixed_arguments", |b| {
        let args = [
            CacheModeArg::Enabled(true),
            CacheModeArg::Named("no_internal"),
            CacheModeArg::Named("no_auto_clear"),
        ];
        b.iter(|| SessionCacheMode::parse(black_box(&args)).unwrap());
    });

    group.finish();
}

fn bench_method_lookup(c: &mut Criterion) {
    c.bench_function("method_from_name", |b| {
        b.iter(|| Method::from_name(black_box("sslv23")).unwrap());
    });
}

criterion_group!(
    benches,
    bench_verify_flag_parsing,
    bench_protocol_option_parsing,
    bench_cache_mode_parsing,
    bench_method_lookup
);
criterion_main!(benches);
