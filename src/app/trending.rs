// src/app/trending.rs
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::app::ledger::PopularityLedger;
use crate::app::types::{PopularityRecord, TrendingList};

/// Loads the trending list once at startup and keeps it for the session.
pub struct TrendingAggregator {
    records: TrendingList,
    rx: Option<Receiver<TrendingList>>,
}

impl TrendingAggregator {
    pub fn start(ledger: Arc<dyn PopularityLedger>, limit: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(ledger.list_top_records(limit));
        });
        Self {
            records: Vec::new(),
            rx: Some(rx),
        }
    }

    /// Returns true when the list arrived this call.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.rx else {
            return false;
        };
        match rx.try_recv() {
            Ok(records) => {
                info!("Loaded {} trending searches", records.len());
                self.records = records;
                self.rx = None;
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("Trending loader exited without a result; hiding trending");
                self.rx = None;
                false
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Hidden entirely when there is nothing to rank.
    pub fn is_visible(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn records(&self) -> &[PopularityRecord] {
        &self.records
    }
}
