//! Criterion benchmarks for the statistics pipeline.
//!
//! Covers: full assembly, counterparty reconciliation, and token enrichment.

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_bigint::BigUint;
use rust_decimal_macros::dec;

use nomis_core::types::{CounterpartyConfig, Erc20Transfer, TokenBalance, Transaction, WalletActivity};
use nomis_stats::counterparty::{CounterpartyInput, CounterpartyReconciler};
use nomis_stats::{StatsAssembler, StatsConfig, StatsRequest, TokenBalanceEnricher};

const WALLET: &str = "0x00000000000000000000000000000000000000aa";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

/// `n` transactions spread over three years, alternating direction and destination.
fn sample_activity(n: usize) -> WalletActivity {
    let mut activity = WalletActivity::empty(WALLET, 1);
    activity.native_balance_raw = BigUint::from(3u64) * BigUint::from(10u64.pow(18));
    activity.native_usd_price = dec!(2500);

    for i in 0..n {
        let counterparty = format!("0x{:040x}", i % 16);
        let (from, to) = if i % 2 == 0 {
            (WALLET.to_string(), counterparty.clone())
        } else {
            (counterparty.clone(), WALLET.to_string())
        };
        let hash = format!("0x{i:064x}");
        let when = start() + Duration::hours(i as i64 * 24 * 1095 / n.max(1) as i64);
        activity.transactions.push(Transaction {
            hash: hash.clone(),
            from: from.clone(),
            to: Some(to.clone()),
            contract_address: None,
            value: BigUint::from(10u64.pow(16)) * BigUint::from(i as u64 % 50),
            timestamp: when,
            is_error: i % 37 == 0,
            method_name: Some(if i % 5 == 0 { "approve" } else { "swap" }.to_string()),
        });
        if i % 3 == 0 {
            activity.erc20_transfers.push(Erc20Transfer {
                hash,
                from,
                to,
                contract_address: "0x00000000000000000000000000000000000000cc".into(),
                value: BigUint::from(1_000_000u64) * BigUint::from(i as u64 + 1),
                token_decimals: Some(6),
                token_symbol: Some("USDC".into()),
                token_name: None,
                timestamp: when,
            });
        }
    }

    for i in 0..32u64 {
        let mut balance = TokenBalance::new(format!("0x{i:040x}"), 1, BigUint::from(10u64.pow(8) * (i + 1)));
        balance.decimals = Some(6);
        balance.symbol = Some(if i % 4 == 0 { "USDT".into() } else { format!("TKN{i}") });
        activity.token_balances.push(balance);
    }
    activity
}

fn bench_assemble(c: &mut Criterion) {
    let activity = sample_activity(1_000);
    let assembler = StatsAssembler::new(TokenBalanceEnricher::offline(), StatsConfig::default());
    let now = start() + Duration::days(1200);

    c.bench_function("assemble_1000_transactions", |b| {
        b.iter(|| assembler.assemble(black_box(&StatsRequest::new(&activity, now))))
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let activity = sample_activity(1_000);
    let enricher = TokenBalanceEnricher::offline();
    let configs: Vec<CounterpartyConfig> = (0..8)
        .map(|i| CounterpartyConfig::new(format!("cp{i}"), format!("0x{i:040x}")))
        .collect();
    let reconciler = CounterpartyReconciler::new(&enricher, Default::default());
    let input = CounterpartyInput {
        wallet: WALLET,
        chain_id: 1,
        transactions: &activity.transactions,
        internal_transactions: &activity.internal_transactions,
        erc20_transfers: &activity.erc20_transfers,
        nft_transfers: &activity.nft_transfers,
        native_decimals: activity.native_decimals,
        native_usd_price: activity.native_usd_price,
    };

    c.bench_function("reconcile_8_counterparties", |b| {
        b.iter(|| reconciler.reconcile(black_box(&configs), black_box(&input)))
    });
}

fn bench_enrich(c: &mut Criterion) {
    let activity = sample_activity(0);
    let enricher = TokenBalanceEnricher::offline();

    c.bench_function("enrich_32_balances", |b| {
        b.iter(|| enricher.enrich(black_box(activity.token_balances.clone())))
    });
}

criterion_group!(benches, bench_assemble, bench_reconcile, bench_enrich);
criterion_main!(benches);
