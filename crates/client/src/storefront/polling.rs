//! Refreshes a pending order until it settles.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Method;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use trinket_store_core::{OrderId, OrderStatus};

use crate::http::{BackendClient, RequestOptions};
use crate::types::Order;

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polls `/orders/{id}` while the order is pending.
///
/// At most one order is polled at a time; starting a new poll stops the
/// previous one. The task is aborted when the poller is dropped.
#[derive(Debug)]
pub struct OrderPoller {
    client: BackendClient,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
    last_update: watch::Sender<Option<DateTime<Utc>>>,
}

impl OrderPoller {
    #[must_use]
    pub fn new(client: BackendClient) -> Self {
        Self::with_interval(client, POLL_INTERVAL)
    }

    #[must_use]
    pub fn with_interval(client: BackendClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            task: Mutex::new(None),
            last_update: watch::Sender::new(None),
        }
    }

    /// When the last successful poll landed.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.borrow()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .ok()
            .is_some_and(|task| task.as_ref().is_some_and(|handle| !handle.is_finished()))
    }

    /// Poll `order_id` now and then every interval, handing each fresh order
    /// to `on_update`. Does nothing unless the order is pending.
    ///
    /// Returns whether polling started.
    pub fn start<F>(&self, order_id: OrderId, status: OrderStatus, on_update: F) -> bool
    where
        F: Fn(Order) + Send + 'static,
    {
        self.stop();
        if !order_id.is_valid() || !status.is_pending() {
            debug!(%order_id, status = status.as_str(), "Order is not pending; not polling");
            return false;
        }

        let client = self.client.clone();
        let interval = self.interval;
        let last_update = self.last_update.clone();
        let handle = tokio::spawn(async move {
            let endpoint = format!("/orders/{order_id}");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let options = RequestOptions::new(Method::GET).silent();
                match client.call::<Order>(&endpoint, options).await {
                    Ok(order) => {
                        let settled = !order.status.is_pending();
                        let status = order.status;
                        last_update.send_replace(Some(Utc::now()));
                        on_update(order);
                        if settled {
                            info!(
                                %order_id,
                                status = status.as_str(),
                                "Order settled; polling stopped"
                            );
                            break;
                        }
                    }
                    Err(error) => warn!(%order_id, %error, "Order poll failed"),
                }
            }
        });

        if let Ok(mut task) = self.task.lock() {
            *task = Some(handle);
        } else {
            handle.abort();
            return false;
        }
        true
    }

    pub fn stop(&self) {
        if let Ok(mut task) = self.task.lock()
            && let Some(handle) = task.take()
        {
            handle.abort();
        }
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
