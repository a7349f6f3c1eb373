// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! Background reconciliation of the downstream mirror.
//!
//! Mirror writes that fail inline are queued and retried with an exponential
//! backoff until they succeed or the attempts are exhausted.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::downstream::types::MirrorRecord;
use crate::downstream::{DownstreamApi, DownstreamError};

/// Sending half of the bounded reconciliation queue.
#[derive(Clone, Debug)]
pub struct MirrorQueue {
    sender: mpsc::Sender<MirrorRecord>,
}

impl MirrorQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MirrorRecord>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn from_config(config: &Config) -> (Self, mpsc::Receiver<MirrorRecord>) {
        Self::new(config.downstream.mirror_queue_capacity)
    }

    /// Enqueue the job without waiting. A full queue drops the job.
    pub fn push(&self, record: MirrorRecord) -> Result<(), DownstreamError> {
        self.sender.try_send(record).map_err(|err| match err {
            TrySendError::Full(record) => {
                warn!(
                    "mirror reconciliation queue is full, dropping the job of {}",
                    record.login
                );
                DownstreamError::QueueFull(record.login)
            }
            TrySendError::Closed(_) => DownstreamError::QueueClosed,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts per job
    pub attempts: u32,
    /// Delay after the first failed attempt
    pub backoff: Duration,
    /// Upper bound of the delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.downstream.mirror_retry_attempts.max(1),
            backoff: Duration::from_millis(config.downstream.mirror_retry_backoff_ms),
            max_backoff: Duration::from_millis(config.downstream.mirror_retry_max_backoff_ms),
        }
    }

    /// Delay before the attempt following the failed `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

pub struct MirrorReconciler<D> {
    downstream: D,
    jobs: mpsc::Receiver<MirrorRecord>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<D: DownstreamApi> MirrorReconciler<D> {
    pub fn new(
        config: &Config,
        downstream: D,
        jobs: mpsc::Receiver<MirrorRecord>,
        cancel: CancellationToken,
    ) -> Self {
        Self::with_policy(downstream, jobs, RetryPolicy::from_config(config), cancel)
    }

    pub fn with_policy(
        downstream: D,
        jobs: mpsc::Receiver<MirrorRecord>,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            downstream,
            jobs,
            policy,
            cancel,
        }
    }

    /// Process jobs until the queue is closed or the token is cancelled.
    pub async fn run(mut self) {
        info!("mirror reconciler started");
        loop {
            let record = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                job = self.jobs.recv() => match job {
                    Some(record) => record,
                    None => break,
                },
            };
            if !self.reconcile(&record).await {
                break;
            }
        }
        info!("mirror reconciler stopped");
    }

    /// Returns `false` when interrupted by the cancellation.
    #[tracing::instrument(level = "info", skip(self, record), fields(login = %record.login))]
    async fn reconcile(&self, record: &MirrorRecord) -> bool {
        let attempts = self.policy.attempts.max(1);
        for attempt in 1..=attempts {
            match self.downstream.upsert_record(record).await {
                Ok(()) => {
                    info!("mirror reconciled after {attempt} attempt(s)");
                    return true;
                }
                Err(err) if attempt == attempts => {
                    warn!("giving up on mirroring after {attempt} attempts: {err}");
                }
                Err(err) => {
                    let delay = self.policy.delay(attempt);
                    debug!("mirror attempt {attempt} failed, retrying in {delay:?}: {err}");
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return false,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        true
    }
}
