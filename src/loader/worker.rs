/// Background loading: each request runs on its own thread and reports back
/// over a channel, tagged so the receiver can discard stale answers.
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::loader::{Loader, SeriesMap};

/// Identifies one load request: the selector it was issued for plus a sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub selector: String,
    pub seq: u64,
}

impl fmt::Display for RequestTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.selector, self.seq)
    }
}

#[derive(Debug)]
pub struct LoadResponse {
    pub tag: RequestTag,
    pub result: Result<SeriesMap, LoadError>,
}

pub struct LoadWorker {
    loader: Arc<dyn Loader>,
    tx: Sender<LoadResponse>,
    rx: Receiver<LoadResponse>,
}

impl LoadWorker {
    pub fn new(loader: Arc<dyn Loader>) -> Self {
        let (tx, rx) = unbounded();
        Self { loader, tx, rx }
    }

    /// Start loading `names` in the background. Never blocks.
    pub fn request(&self, tag: RequestTag, names: BTreeSet<String>) {
        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        debug!(%tag, packages = names.len(), "load requested");
        let reply = tag.clone();
        let spawned = thread::Builder::new()
            .name(format!("load-{}", tag.seq))
            .spawn(move || {
                let result = loader.load(&names);
                // The receiver is gone only when the app is shutting down.
                let _ = tx.send(LoadResponse { tag, result });
            });
        if let Err(e) = spawned {
            self.fail(reply, &e);
        }
    }

    /// Answer `tag` with a failure so the request does not stay pending.
    fn fail(&self, tag: RequestTag, error: &io::Error) {
        warn!(%tag, error = %error, "failed to spawn load thread");
        let result = Err(LoadError::new(format!("could not start loader: {}", error)));
        let _ = self.tx.send(LoadResponse { tag, result });
    }

    /// Next finished response, if any.
    pub fn poll(&self) -> Option<LoadResponse> {
        match self.rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block up to `timeout` for the next response.
    pub fn wait(&self, timeout: Duration) -> Option<LoadResponse> {
        match self.rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
