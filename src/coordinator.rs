//! Concurrent fan-out of per-sample dispatches with join-all semantics.
//!
//! Every pending sample gets its own dispatch; the coordinator waits for all
//! of them before returning. Runner failures are per-sample outcomes. Only a
//! failure to launch or prepare a dispatch is surfaced as an error, and only
//! after every other dispatch has finished. There is no cancellation and no
//! timeout: a hung runner holds the whole batch.
use crate::context::RunContext;
use crate::manifest::Sample;
use crate::runner::{dispatch, DispatchOutcome};
use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;

/// Outcome of one sample in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutcome {
    pub sample_id: String,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Completed dispatches in manifest order.
    pub outcomes: Vec<SampleOutcome>,
    /// First launch/preparation error observed, if any.
    pub first_error: Option<anyhow::Error>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|entry| entry.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    fn record(&mut self, mut results: Vec<(usize, String, Result<DispatchOutcome>)>) {
        results.sort_by_key(|(index, _, _)| *index);
        for (_, sample_id, result) in results {
            match result {
                Ok(outcome) => self.outcomes.push(SampleOutcome { sample_id, outcome }),
                Err(err) => {
                    tracing::error!(sample = %sample_id, "dispatch failed: {err:#}");
                    println!("SampleId: {sample_id} could not be dispatched: {err:#}");
                    if self.first_error.is_none() {
                        self.first_error = Some(err);
                    }
                }
            }
        }
    }
}

/// Dispatch every sample concurrently and wait for all of them.
///
/// With `max_parallel` unset, one thread per sample is started; otherwise
/// that many workers drain a shared queue.
pub fn dispatch_all(
    ctx: &RunContext,
    samples: &[&Sample],
    timestamp: &str,
    max_parallel: Option<usize>,
) -> BatchReport {
    let mut report = BatchReport::default();
    if samples.is_empty() {
        return report;
    }
    let results = match max_parallel {
        Some(limit) if limit < samples.len() => {
            dispatch_bounded(ctx, samples, timestamp, limit.max(1))
        }
        _ => dispatch_unbounded(ctx, samples, timestamp),
    };
    report.record(results);
    report
}

fn dispatch_unbounded(
    ctx: &RunContext,
    samples: &[&Sample],
    timestamp: &str,
) -> Vec<(usize, String, Result<DispatchOutcome>)> {
    thread::scope(|scope| {
        let mut results = Vec::with_capacity(samples.len());
        let mut handles = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().copied().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("dispatch-{}", sample.sample_id))
                .spawn_scoped(scope, move || dispatch(ctx, sample, timestamp));
            match spawned {
                Ok(handle) => handles.push((index, sample.sample_id.clone(), handle)),
                Err(err) => results.push((
                    index,
                    sample.sample_id.clone(),
                    Err(anyhow!("start dispatch thread: {err}")),
                )),
            }
        }
        for (index, sample_id, handle) in handles {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(anyhow!("dispatch thread panicked")));
            results.push((index, sample_id, result));
        }
        results
    })
}

fn dispatch_bounded(
    ctx: &RunContext,
    samples: &[&Sample],
    timestamp: &str,
    workers: usize,
) -> Vec<(usize, String, Result<DispatchOutcome>)> {
    let queue = Mutex::new(samples.iter().copied().enumerate().collect::<VecDeque<_>>());
    thread::scope(|scope| {
        let queue = &queue;
        let mut results = Vec::with_capacity(samples.len());
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let spawned = thread::Builder::new()
                .name(format!("dispatch-worker-{worker}"))
                .spawn_scoped(scope, move || {
                    let mut done = Vec::new();
                    loop {
                        let next = match queue.lock() {
                            Ok(mut guard) => guard.pop_front(),
                            Err(_) => break,
                        };
                        let Some((index, sample)) = next else {
                            break;
                        };
                        let result = dispatch(ctx, sample, timestamp);
                        done.push((index, sample.sample_id.clone(), result));
                    }
                    done
                });
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(err) => tracing::warn!(worker, "cannot start dispatch worker: {err}"),
            }
        }
        if handles.is_empty() {
            // Nothing will drain the queue; report every sample as unlaunched.
            let drained = match queue.lock() {
                Ok(mut guard) => guard.drain(..).collect::<Vec<_>>(),
                Err(_) => Vec::new(),
            };
            for (index, sample) in drained {
                results.push((
                    index,
                    sample.sample_id.clone(),
                    Err(anyhow!("no dispatch worker could be started")),
                ));
            }
        }
        for (worker, handle) in handles {
            match handle.join() {
                Ok(done) => results.extend(done),
                Err(_) => results.push((
                    usize::MAX,
                    format!("dispatch-worker-{worker}"),
                    Err(anyhow!("dispatch worker panicked")),
                )),
            }
        }
        results
    })
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
