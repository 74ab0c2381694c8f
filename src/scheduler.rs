//! Periodic background retraining.
//!
//! A single worker thread waits on a stop channel with a timeout. Each
//! timeout is a tick: a scheduled retrain (skipped if another retrain is in
//! flight) and, when configured, a statistics log line. Stopping sends on the
//! channel and joins the worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

use crate::config::SchedulerConfig;
use crate::engine::{PriorityEngine, RetrainTrigger};
use crate::error::{Result, UrgencyError};

/// Handle to a running retrain scheduler.
#[derive(Debug)]
pub struct RetrainScheduler {
    stop_sender: Sender<()>,
    worker: Option<JoinHandle<SchedulerStats>>,
    ticks: Arc<AtomicU64>,
}

/// Counters reported when the scheduler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Scheduled retrains attempted.
    pub ticks: u64,
    /// Scheduled retrains that published a model.
    pub retrains: u64,
}

impl RetrainScheduler {
    /// Start ticking for `engine` with `config`'s intervals.
    pub fn start(engine: PriorityEngine, config: &SchedulerConfig) -> Result<Self> {
        Self::start_with_intervals(
            engine,
            config.retrain_interval(),
            config.statistics_interval(),
        )
    }

    /// Start with explicit intervals.
    pub fn start_with_intervals(
        engine: PriorityEngine,
        retrain_interval: Duration,
        statistics_interval: Option<Duration>,
    ) -> Result<Self> {
        if retrain_interval.is_zero() {
            return Err(UrgencyError::scheduler("retrain interval must be positive"));
        }

        let (stop_sender, stop_receiver) = bounded(1);
        let ticks = Arc::new(AtomicU64::new(0));
        let worker_ticks = Arc::clone(&ticks);
        let worker = thread::Builder::new()
            .name("urgency-scheduler".to_string())
            .spawn(move || {
                run(
                    engine,
                    stop_receiver,
                    worker_ticks,
                    retrain_interval,
                    statistics_interval,
                )
            })?;

        log::info!("retrain scheduler started, interval {retrain_interval:?}");
        Ok(RetrainScheduler {
            stop_sender,
            worker: Some(worker),
            ticks,
        })
    }

    /// Scheduled retrains attempted so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Whether the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop the worker and wait for it. A tick in progress completes first.
    pub fn stop(mut self) -> Result<SchedulerStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<SchedulerStats> {
        let Some(worker) = self.worker.take() else {
            return Ok(SchedulerStats::default());
        };

        let _ = self.stop_sender.try_send(());
        let stats = worker
            .join()
            .map_err(|_| UrgencyError::scheduler("scheduler thread panicked"))?;
        log::info!(
            "retrain scheduler stopped after {} ticks ({} retrains)",
            stats.ticks,
            stats.retrains
        );
        Ok(stats)
    }
}

impl Drop for RetrainScheduler {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{e}");
        }
    }
}

fn run(
    engine: PriorityEngine,
    stop: Receiver<()>,
    ticks: Arc<AtomicU64>,
    retrain_interval: Duration,
    statistics_interval: Option<Duration>,
) -> SchedulerStats {
    let mut stats = SchedulerStats::default();
    let mut next_retrain = Instant::now() + retrain_interval;
    let mut next_statistics = statistics_interval.map(|i| Instant::now() + i);

    loop {
        let deadline = match next_statistics {
            Some(at) => at.min(next_retrain),
            None => next_retrain,
        };

        match stop.recv_deadline(deadline) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        if now >= next_retrain {
            stats.ticks += 1;
            if engine.retrain_if_idle(RetrainTrigger::Scheduled).is_some() {
                stats.retrains += 1;
            }
            ticks.fetch_add(1, Ordering::AcqRel);
            next_retrain = Instant::now() + retrain_interval;
        }

        if let (Some(at), Some(interval)) = (next_statistics, statistics_interval)
            && now >= at
        {
            log_statistics(&engine);
            next_statistics = Some(Instant::now() + interval);
        }
    }

    stats
}

fn log_statistics(engine: &PriorityEngine) {
    match engine.model_statistics() {
        Ok(stats) => log::info!(
            "model statistics: trained={} examples={} priorities={:?} languages={:?}",
            stats.trained,
            stats.example_count,
            stats.priority_distribution,
            stats.language_distribution
        ),
        Err(e) => log::warn!("failed to collect model statistics: {e}"),
    }
}
