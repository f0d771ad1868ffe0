//! Engine runtime: the single-writer task that owns the [`Engine`].
//!
//! Three timer sources feed one `select!` loop: the signal refresh
//! interval, the trading-cycle interval (present only while auto-trading
//! is on), and the queue of pending trade resolutions. Commands arrive over
//! an mpsc channel from any number of [`EngineHandle`] clones. Each event
//! runs to completion before the next is polled, so no two mutations ever
//! overlap. Ready branches are taken in a fixed order (commands, due
//! resolutions, signal refresh, cycle), which keeps seeded runs
//! reproducible.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::trader::PendingResolution;
use super::Engine;
use crate::config::EngineConfig;
use crate::types::{Candle, EngineSettings, LedgerSnapshot, Signal, SimError, TraderState};

const COMMAND_BUFFER: usize = 64;

/// Timer periods for the runtime.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub signal_refresh: Duration,
    pub cycle_period: Duration,
    pub resolution_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for Timing {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            signal_refresh: cfg.signal_refresh(),
            cycle_period: cfg.cycle_period(),
            resolution_delay: cfg.resolution_delay(),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum Command {
    SetAutoTrading {
        enabled: bool,
        reply: oneshot::Sender<EngineSettings>,
    },
    SetMinBet {
        value: Decimal,
        reply: oneshot::Sender<Result<EngineSettings, SimError>>,
    },
    SetMaxBet {
        value: Decimal,
        reply: oneshot::Sender<Result<EngineSettings, SimError>>,
    },
    SelectPair {
        pair: String,
        reply: oneshot::Sender<Result<EngineSettings, SimError>>,
    },
    Signals {
        reply: oneshot::Sender<Vec<Signal>>,
    },
    Ledger {
        reply: oneshot::Sender<LedgerSnapshot>,
    },
    Settings {
        reply: oneshot::Sender<EngineSettings>,
    },
    Candles {
        reply: oneshot::Sender<Vec<Candle>>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable command/query client for a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
}

impl EngineHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, SimError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| SimError::EngineStopped)?;
        rx.await.map_err(|_| SimError::EngineStopped)
    }

    pub async fn set_auto_trading(&self, enabled: bool) -> Result<EngineSettings, SimError> {
        self.request(|reply| Command::SetAutoTrading { enabled, reply })
            .await
    }

    pub async fn set_min_bet(&self, value: Decimal) -> Result<EngineSettings, SimError> {
        self.request(|reply| Command::SetMinBet { value, reply })
            .await?
    }

    pub async fn set_max_bet(&self, value: Decimal) -> Result<EngineSettings, SimError> {
        self.request(|reply| Command::SetMaxBet { value, reply })
            .await?
    }

    pub async fn select_pair(&self, pair: impl Into<String>) -> Result<EngineSettings, SimError> {
        let pair = pair.into();
        self.request(|reply| Command::SelectPair { pair, reply })
            .await?
    }

    pub async fn signals(&self) -> Result<Vec<Signal>, SimError> {
        self.request(|reply| Command::Signals { reply }).await
    }

    pub async fn ledger_snapshot(&self) -> Result<LedgerSnapshot, SimError> {
        self.request(|reply| Command::Ledger { reply }).await
    }

    pub async fn settings(&self) -> Result<EngineSettings, SimError> {
        self.request(|reply| Command::Settings { reply }).await
    }

    pub async fn candles(&self) -> Result<Vec<Candle>, SimError> {
        self.request(|reply| Command::Candles { reply }).await
    }

    /// Ask the runtime to stop. In-flight resolutions are abandoned.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

pub struct EngineRuntime {
    engine: Engine,
    timing: Timing,
    commands: mpsc::Receiver<Command>,
    cycle: Option<Interval>,
    /// Schedule order; with a fixed delay this is also due order.
    pending: VecDeque<(Instant, PendingResolution)>,
}

impl EngineRuntime {
    /// Spawn the runtime on the current tokio runtime.
    ///
    /// The task ends on [`EngineHandle::shutdown`] or when every handle
    /// has been dropped, and yields the engine back for inspection.
    pub fn spawn(engine: Engine, timing: Timing) -> (EngineHandle, JoinHandle<Engine>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let runtime = EngineRuntime {
            engine,
            timing,
            commands: rx,
            cycle: None,
            pending: VecDeque::new(),
        };
        let task = tokio::spawn(runtime.run());
        (EngineHandle { tx }, task)
    }

    async fn run(mut self) -> Engine {
        let mut refresh = time::interval_at(
            Instant::now() + self.timing.signal_refresh,
            self.timing.signal_refresh,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // An engine handed over already enabled gets its cycle timer now.
        if self.engine.trader_state() == TraderState::Enabled {
            self.start_cycle_timer();
        }

        info!(
            refresh_secs = self.timing.signal_refresh.as_secs_f64(),
            cycle_secs = self.timing.cycle_period.as_secs_f64(),
            resolution_secs = self.timing.resolution_delay.as_secs_f64(),
            "Engine runtime started"
        );

        loop {
            let next_due = self.pending.front().map(|(due, _)| *due);

            // Fixed priority when timers coincide: settlements land before
            // the refresh, and a cycle always sees both.
            tokio::select! {
                biased;

                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = sleep_until(next_due) => self.resolve_due(),
                _ = refresh.tick() => self.engine.refresh_signals(),
                at = next_cycle(&mut self.cycle) => self.on_cycle(at),
            }
        }

        info!(
            pending = self.pending.len(),
            balance = format!("${:.2}", self.engine.balance()),
            "Engine runtime stopped"
        );
        self.engine
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::SetAutoTrading { enabled, reply } => {
                self.set_auto_trading(enabled);
                let _ = reply.send(self.engine.settings());
            }
            Command::SetMinBet { value, reply } => {
                let result = self.engine.set_min_bet(value).map(|_| self.engine.settings());
                let _ = reply.send(result);
            }
            Command::SetMaxBet { value, reply } => {
                let result = self.engine.set_max_bet(value).map(|_| self.engine.settings());
                let _ = reply.send(result);
            }
            Command::SelectPair { pair, reply } => {
                let result = self.engine.select_pair(&pair).map(|_| self.engine.settings());
                let _ = reply.send(result);
            }
            Command::Signals { reply } => {
                let _ = reply.send(self.engine.signals().to_vec());
            }
            Command::Ledger { reply } => {
                let _ = reply.send(self.engine.ledger_snapshot());
            }
            Command::Settings { reply } => {
                let _ = reply.send(self.engine.settings());
            }
            Command::Candles { reply } => {
                let _ = reply.send(self.engine.candles().to_vec());
            }
            Command::Shutdown => {}
        }
    }

    fn set_auto_trading(&mut self, enabled: bool) {
        if !self.engine.set_auto_trading(enabled) {
            return;
        }
        if enabled {
            self.start_cycle_timer();
        } else {
            // Only future cycles stop; queued resolutions still fire.
            self.cycle = None;
        }
    }

    fn start_cycle_timer(&mut self) {
        let period = self.timing.cycle_period;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.cycle = Some(interval);
    }

    /// `at` is the scheduled tick, so a resolution falls due exactly on a
    /// later tick instead of just after it.
    fn on_cycle(&mut self, at: Instant) {
        let report = self.engine.run_cycle();
        if let Some(pending) = report.pending() {
            let due = at + self.timing.resolution_delay;
            debug!(trade_id = %pending.trade_id, "Resolution scheduled");
            self.pending.push_back((due, pending));
        }
        if report.stop_loss_tripped {
            self.cycle = None;
        }
    }

    fn resolve_due(&mut self) {
        let now = Instant::now();
        while let Some((due, _)) = self.pending.front() {
            if *due > now {
                break;
            }
            if let Some((_, pending)) = self.pending.pop_front() {
                self.engine.resolve(&pending);
            }
        }
    }
}

async fn next_cycle(cycle: &mut Option<Interval>) -> Instant {
    match cycle {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(due: Option<Instant>) {
    match due {
        Some(due) => time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
