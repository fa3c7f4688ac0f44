//! Timer Driver
//!
//! Recomputes the summary on a fixed interval and posts it when the diff
//! moved. Ticks never overlap: each one finishes before the next is awaited.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::{TriggerDriver, TriggerMode};
use crate::error::{BotError, Result};
use crate::service::WalletService;

pub struct TimerDriver {
    service: WalletService,
    interval: Duration,
    ticks: u64,
    announced: bool,
}

impl TimerDriver {
    pub const fn new(service: WalletService, interval: Duration) -> Self {
        Self {
            service,
            interval,
            ticks: 0,
            announced: false,
        }
    }

    pub const fn service(&self) -> &WalletService {
        &self.service
    }

    /// Run one cycle; returns whether a summary was posted.
    ///
    /// The first successful cycle always posts so the channel sees the
    /// starting point, even when earlier ticks failed.
    pub async fn tick(&mut self) -> Result<bool> {
        self.ticks += 1;
        let refresh = self.service.refresh().await?;

        if refresh.changed || !self.announced {
            self.service.post_summary(&refresh.summary).await?;
            self.announced = true;
            Ok(true)
        } else {
            debug!(tick = self.ticks, diff = %refresh.summary.diff, "No change, skipping post");
            Ok(false)
        }
    }
}

#[async_trait]
impl TriggerDriver for TimerDriver {
    fn mode(&self) -> TriggerMode {
        TriggerMode::Timer
    }

    async fn run(&mut self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(BotError::Config("poll interval must be greater than zero".into()));
        }

        info!(interval = ?self.interval, "Starting timer driver");
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                error!(tick = self.ticks, error = %e, "Scheduled summary failed");
            }
        }
    }
}
