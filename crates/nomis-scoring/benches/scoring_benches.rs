//! Criterion benchmarks for the scoring engine.
//!
//! Covers: single-model scoring, the full model sweep, and step evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use nomis_core::traits::ScoreCalculator;
use nomis_core::{ScoringCalculationModel, WalletStats};
use nomis_scoring::profiles::BALANCE_USD;
use nomis_scoring::ScoringEngine;

fn sample_stats() -> WalletStats {
    WalletStats {
        address: "0x00000000000000000000000000000000000000aa".into(),
        chain_id: 1,
        native_balance_usd: dec!(4200),
        hold_tokens_balance_usd: dec!(800),
        historical_median_balance_usd: Some(dec!(3900)),
        turnover: dec!(37.5),
        turnover_usd: Some(dec!(93750)),
        wallet_age_months: 27,
        total_transactions: 310,
        last_month_transactions: 6,
        deployed_contracts: 1,
        tokens_holding: 8,
        nft_holding: 3,
        nft_trades: 7,
        nft_worth_usd: dec!(640),
        ..WalletStats::default()
    }
}

fn bench_score(c: &mut Criterion) {
    let engine = ScoringEngine::new();
    let stats = sample_stats();

    c.bench_function("score_common_v1", |b| {
        b.iter(|| engine.score(black_box(&stats), black_box(ScoringCalculationModel::CommonV1)))
    });
}

fn bench_all_models(c: &mut Criterion) {
    let engine = ScoringEngine::new();
    let stats = sample_stats();

    c.bench_function("score_all_models", |b| {
        b.iter(|| {
            ScoringCalculationModel::ALL
                .iter()
                .map(|m| engine.score(black_box(&stats), *m))
                .count()
        })
    });
}

fn bench_step_table(c: &mut Criterion) {
    c.bench_function("step_table_evaluate", |b| {
        b.iter(|| BALANCE_USD.evaluate(black_box(dec!(7777))))
    });
}

criterion_group!(benches, bench_score, bench_all_models, bench_step_table);
criterion_main!(benches);
