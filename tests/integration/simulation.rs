//! End-to-end simulation runs.
//!
//! Drives the engine runtime on paused tokio time through its public
//! handle and checks ledger arithmetic and stop-loss behaviour over many
//! cycles.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::task::JoinHandle;

use otc_autotrader::config::AppConfig;
use otc_autotrader::engine::random::{RandomSource, StdRandom};
use otc_autotrader::engine::runtime::{EngineHandle, EngineRuntime, Timing};
use otc_autotrader::engine::Engine;
use otc_autotrader::types::TradeStatus;

use crate::scripted_random::{ScriptedRandom, LOSS, WIN};

fn start(rng: Box<dyn RandomSource>) -> (EngineHandle, JoinHandle<Engine>) {
    let cfg = AppConfig::default();
    let engine = Engine::new(&cfg, rng).unwrap();
    EngineRuntime::spawn(engine, Timing::from(&cfg.engine))
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn test_scripted_win_loss_sequence() {
    let rng = ScriptedRandom::new(80).with_outcomes(&[WIN, LOSS, WIN]);
    let (handle, _task) = start(Box::new(rng));
    handle.set_auto_trading(true).await.unwrap();

    // Cycles open at t=60, 120, 180.
    advance(181).await;
    handle.set_auto_trading(false).await.unwrap();
    advance(120).await;

    let snap = handle.ledger_snapshot().await.unwrap();
    assert_eq!(snap.trades.len(), 3);
    assert_eq!(snap.active_trades, 0);

    // Most recent first; resolutions ran in open order.
    assert_eq!(snap.trades[2].status, TradeStatus::Win);
    assert_eq!(snap.trades[1].status, TradeStatus::Loss);
    assert_eq!(snap.trades[0].status, TradeStatus::Win);

    assert_eq!(snap.balance, dec!(1000.35));
    assert_eq!(snap.total_profit, dec!(0.35));
    assert_eq!(snap.wins, 2);
    assert_eq!(snap.losses, 1);
    assert!((snap.win_rate - 2.0 / 3.0).abs() < 1e-12);
}

#[tokio::test(start_paused = true)]
async fn test_stop_loss_then_manual_reenable() {
    let rng = ScriptedRandom::new(90).with_outcomes(&[LOSS; 8]);
    let (handle, _task) = start(Box::new(rng));
    handle.set_min_bet(dec!(5)).await.unwrap();
    handle.set_auto_trading(true).await.unwrap();

    // t=60 opens (995), t=120 reads 995 and opens (990),
    // t=180 reads 990, opens (985) and trips.
    advance(181).await;
    assert!(!handle.settings().await.unwrap().auto_trading);
    assert_eq!(handle.ledger_snapshot().await.unwrap().trades.len(), 3);

    advance(300).await;
    let snap = handle.ledger_snapshot().await.unwrap();
    assert_eq!(snap.trades.len(), 3);
    assert_eq!(snap.active_trades, 0);
    assert_eq!(snap.balance, dec!(985));

    // Re-enabling is allowed; the next cycle trips again straight away.
    handle.set_auto_trading(true).await.unwrap();
    advance(61).await;
    assert_eq!(handle.ledger_snapshot().await.unwrap().trades.len(), 4);
    assert!(!handle.settings().await.unwrap().auto_trading);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_runs_keep_ledger_identity() {
    for seed in 0..5 {
        let (handle, task) = start(Box::new(StdRandom::seeded(seed)));
        handle.set_min_bet(dec!(10)).await.unwrap();
        handle.set_auto_trading(true).await.unwrap();

        advance(3_600).await;
        handle.set_auto_trading(false).await.unwrap();
        advance(120).await;

        let snap = handle.ledger_snapshot().await.unwrap();
        assert_eq!(snap.active_trades, 0, "seed {seed}");
        assert_eq!(snap.balance, snap.initial_balance + snap.total_profit, "seed {seed}");
        assert_eq!(snap.wins + snap.losses, snap.trades.len());

        for trade in &snap.trades {
            assert_eq!(trade.stake, dec!(10));
            assert!(trade.confidence >= 75);
            match trade.status {
                TradeStatus::Win => assert_eq!(trade.profit, dec!(8.5)),
                TradeStatus::Loss => assert_eq!(trade.profit, dec!(-10)),
                TradeStatus::Active => unreachable!(),
            }
        }

        // Settled balance bounds what the next cycle read from above, so once
        // it drops below the floor at most one more trade may open.
        let floor = snap.initial_balance - dec!(5);
        let mut balance = snap.initial_balance;
        let mut opened_after_breach = 0;
        let mut breached = false;
        for trade in snap.trades.iter().rev() {
            if breached {
                opened_after_breach += 1;
            }
            balance -= trade.stake;
            if trade.status == TradeStatus::Win {
                balance += trade.stake + trade.profit;
            }
            if balance < floor {
                breached = true;
            }
        }
        assert!(opened_after_breach <= 1, "seed {seed}: trades opened after stop-loss");

        handle.shutdown().await;
        let engine = task.await.unwrap();
        assert_eq!(engine.balance(), snap.balance);
    }
}

#[tokio::test(start_paused = true)]
async fn test_max_bet_does_not_change_stake() {
    let rng = ScriptedRandom::new(85).with_outcomes(&[WIN; 4]);
    let (handle, _task) = start(Box::new(rng));
    handle.set_max_bet(dec!(500)).await.unwrap();
    handle.set_auto_trading(true).await.unwrap();

    advance(61).await;
    let snap = handle.ledger_snapshot().await.unwrap();
    assert_eq!(snap.trades.len(), 1);
    assert_eq!(snap.trades[0].stake, dec!(0.5));
    assert_eq!(snap.balance, dec!(1000) - dec!(0.5));
    assert!(snap.total_profit == Decimal::ZERO);
}
