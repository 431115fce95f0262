//! Scheduled refresh of the dataset.
//!
//! The poller fetches once immediately, then on every interval tick and on
//! explicit refresh requests. Each fetch runs as its own task, so a slow
//! request never holds up the timer, and is tagged with a generation number.
//! Consumers apply an outcome only if it is newer than the last one they
//! applied ([`Generation::accept`]); completion order doesn't matter.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::error::SheetError;
use crate::model::Dataset;
use crate::sheet::DatasetSource;

/// Result of one fetch, tagged with the order in which it was started.
#[derive(Debug)]
pub struct FetchOutcome {
  pub generation: u64,
  pub result: Result<Dataset, SheetError>,
}

/// Last-applied generation tracker on the consumer side.
#[derive(Debug, Default, Clone, Copy)]
pub struct Generation(Option<u64>);

impl Generation {
  /// True if `generation` is newer than anything applied so far; records it.
  pub fn accept(&mut self, generation: u64) -> bool {
    match self.0 {
      Some(applied) if generation <= applied => false,
      _ => {
        self.0 = Some(generation);
        true
      }
    }
  }
}

pub struct Poller {
  handle: JoinHandle<()>,
  refresh_tx: mpsc::Sender<()>,
}

impl Poller {
  /// Spawn the polling task. The first fetch starts right away.
  pub fn start<S: DatasetSource>(source: S, every: Duration, tx: mpsc::UnboundedSender<FetchOutcome>) -> Self {
    let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);
    let source = Arc::new(source);

    let handle = tokio::spawn(async move {
      let mut ticker = interval(every);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      let mut in_flight = JoinSet::new();
      let mut generation = 0u64;

      loop {
        tokio::select! {
          _ = ticker.tick() => {
            debug!("poller: interval tick");
          }
          Some(()) = refresh_rx.recv() => {
            debug!("poller: refresh requested");
            ticker.reset();
          }
          Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
            if let Err(e) = joined {
              warn!(err = %e, "poller: fetch task ended abnormally");
            }
            continue;
          }
        }

        generation += 1;
        if !in_flight.is_empty() {
          info!(generation, in_flight = in_flight.len(), "poller: starting fetch while another is in flight");
        }
        let source = Arc::clone(&source);
        let tx = tx.clone();
        in_flight.spawn(async move {
          let result = source.fetch_all().await;
          // The receiver is gone only during teardown.
          let _ = tx.send(FetchOutcome { generation, result });
        });
      }
    });

    Self { handle, refresh_tx }
  }

  /// Ask for a fetch now; coalesces with a request that hasn't been picked up yet.
  pub fn refresh_now(&self) {
    let _ = self.refresh_tx.try_send(());
  }

  /// Stop the timer and abort in-flight fetches.
  pub fn stop(self) {
    self.handle.abort();
  }
}

impl Drop for Poller {
  fn drop(&mut self) {
    self.handle.abort();
  }
}
