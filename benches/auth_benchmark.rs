use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use workout_tracker::config::Config;
use workout_tracker::services::{PasswordHasher, TokenService, TokenType};

fn benchmark_tokens(c: &mut Criterion) {
    let tokens = TokenService::new(&Config::test_default());
    let access = tokens
        .issue_access("bench@example.com")
        .expect("Failed to issue token");

    let mut group = c.benchmark_group("tokens");

    group.bench_function("issue_pair", |b| {
        b.iter(|| tokens.issue_pair(black_box("bench@example.com")))
    });

    group.bench_function("verify_access", |b| {
        b.iter(|| tokens.verify(black_box(&access), Some(TokenType::Access)))
    });

    group.finish();
}

fn benchmark_passwords(c: &mut Criterion) {
    // Cost 4 measures the call overhead, not production hashing time
    let hasher = PasswordHasher::new(4);
    let hash = hasher
        .hash("correct-horse-battery")
        .expect("Failed to hash password");

    let mut group = c.benchmark_group("passwords");

    group.bench_function("hash", |b| {
        b.iter(|| hasher.hash(black_box("correct-horse-battery")))
    });

    group.bench_function("verify", |b| {
        b.iter(|| hasher.verify(black_box("correct-horse-battery"), &hash))
    });

    group.bench_function("verify_dummy", |b| {
        b.iter(|| hasher.verify_dummy(black_box("correct-horse-battery")))
    });

    group.finish();
}

criterion_group!(benches, benchmark_tokens, benchmark_passwords);
criterion_main!(benches);
