//! Detail page enrichment through a bounded worker pool.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use bondlist_core::types::BondRecord;
use bondlist_sources::detail::fetch_detail;
use bondlist_traits::DocumentFetcher;

use crate::error::{EngineError, EngineResult};

/// Detail enrichment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    /// Records sent to the workers.
    pub requested: usize,
    /// Detail pages found and parsed.
    pub found: usize,
    /// Searches without a result.
    pub not_found: usize,
    /// Fetch or parse failures.
    pub failed: usize,
}

impl EnrichStats {
    fn absorb(&mut self, other: EnrichStats) {
        self.found += other.found;
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

type Queue = Arc<Mutex<mpsc::Receiver<(usize, BondRecord)>>>;

/// Fetches the detail page of every record with `workers` concurrent workers.
///
/// Records are handed out through a shared queue and each one is owned by a
/// single worker while it is enriched. A failure for one bond is logged and the
/// bond keeps no details. Records come back in their original order.
pub async fn enrich_details<F>(
    fetcher: Arc<F>,
    records: Vec<BondRecord>,
    workers: usize,
) -> EngineResult<(Vec<BondRecord>, EnrichStats)>
where
    F: DocumentFetcher + ?Sized + 'static,
{
    let workers = workers.max(1);
    let mut stats = EnrichStats {
        requested: records.len(),
        ..EnrichStats::default()
    };

    let (sender, receiver) = mpsc::channel(workers);
    let queue: Queue = Arc::new(Mutex::new(receiver));

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        pool.spawn(work(worker, Arc::clone(&fetcher), Arc::clone(&queue)));
    }
    drop(queue);

    for item in records.into_iter().enumerate() {
        if sender.send(item).await.is_err() {
            break;
        }
    }
    drop(sender);

    let mut enriched = Vec::with_capacity(stats.requested);
    while let Some(joined) = pool.join_next().await {
        let (done, worker_stats) = joined.map_err(|e| EngineError::Worker(e.to_string()))?;
        enriched.extend(done);
        stats.absorb(worker_stats);
    }
    enriched.sort_by_key(|(index, _)| *index);

    info!(
        requested = stats.requested,
        found = stats.found,
        not_found = stats.not_found,
        failed = stats.failed,
        "fetched detail pages"
    );
    Ok((enriched.into_iter().map(|(_, r)| r).collect(), stats))
}

async fn work<F>(
    worker: usize,
    fetcher: Arc<F>,
    queue: Queue,
) -> (Vec<(usize, BondRecord)>, EnrichStats)
where
    F: DocumentFetcher + ?Sized + 'static,
{
    let mut done = Vec::new();
    let mut stats = EnrichStats::default();
    loop {
        let next = queue.lock().await.recv().await;
        let Some((index, mut record)) = next else {
            break;
        };
        match fetch_detail(fetcher.as_ref(), &record.isin).await {
            Ok(Some(detail)) => {
                record.detail = Some(detail);
                stats.found += 1;
            }
            Ok(None) => {
                debug!(isin = %record.isin, "no detail page");
                stats.not_found += 1;
            }
            Err(e) => {
                warn!(isin = %record.isin, error = %e, "detail page failed");
                stats.failed += 1;
            }
        }
        done.push((index, record));
    }
    debug!(worker, handled = done.len(), "detail worker done");
    (done, stats)
}
