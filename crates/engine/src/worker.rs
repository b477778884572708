use std::{
    io,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Receiver, Sender};
use fprop_fs::StatSnapshot;
use log::{debug, warn};

/// Why a stat was requested; decides how its completion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Summary,
    Details,
}

#[derive(Debug)]
pub struct StatRequest {
    pub ticket: u64,
    pub purpose: Purpose,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct StatCompletion {
    pub ticket: u64,
    pub purpose: Purpose,
    pub path: PathBuf,
    pub result: io::Result<StatSnapshot>,
}

impl StatCompletion {
    pub fn for_request(request: StatRequest, result: io::Result<StatSnapshot>) -> Self {
        Self {
            ticket: request.ticket,
            purpose: request.purpose,
            path: request.path,
            result,
        }
    }
}

/// The filesystem call behind every request.
pub trait StatProvider: Send + 'static {
    fn stat(&self, path: &Path) -> io::Result<StatSnapshot>;
}

/// Real `stat(2)`, following symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStat;

impl StatProvider for FsStat {
    fn stat(&self, path: &Path) -> io::Result<StatSnapshot> {
        fprop_fs::stat(path)
    }
}

/// `lstat(2)`: a symlink is described as itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLstat;

impl StatProvider for FsLstat {
    fn stat(&self, path: &Path) -> io::Result<StatSnapshot> {
        fprop_fs::lstat(path)
    }
}

/// How long dropping a [`StatWorker`] waits for an in-flight stat.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Runs stat calls off the event loop and hands results back over a channel.
pub struct StatWorker {
    requests: Option<Sender<StatRequest>>,
    completions: Receiver<StatCompletion>,
    handle: Option<JoinHandle<()>>,
}

impl StatWorker {
    /// Start a background thread serving requests with `provider`.
    pub fn spawn(provider: impl StatProvider) -> io::Result<Self> {
        let (request_tx, request_rx) = channel::unbounded::<StatRequest>();
        let (completion_tx, completion_rx) = channel::unbounded::<StatCompletion>();

        let handle = thread::Builder::new()
            .name("fprop-stat".to_owned())
            .spawn(move || worker_loop(provider, request_rx, completion_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            completions: completion_rx,
            handle: Some(handle),
        })
    }

    /// Use caller-owned channels instead of a thread. Whoever holds the other
    /// ends plays the worker, which lets completions be delivered in any order.
    pub fn from_channels(
        requests: Sender<StatRequest>,
        completions: Receiver<StatCompletion>,
    ) -> Self {
        Self {
            requests: Some(requests),
            completions,
            handle: None,
        }
    }

    /// Queue a request. Returns `false` if the worker has gone away.
    pub fn submit(&self, request: StatRequest) -> bool {
        match &self.requests {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    pub fn completions(&self) -> &Receiver<StatCompletion> {
        &self.completions
    }
}

impl Drop for StatWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        let Some(handle) = self.handle.take() else {
            return;
        };

        // A stat stuck on a hung mount must not block shutdown; such a thread
        // is left detached.
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("Stat worker still busy after {SHUTDOWN_GRACE:?}; detaching it");
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }

        if handle.join().is_err() {
            warn!("Stat worker thread panicked");
        }
    }
}

fn worker_loop(
    provider: impl StatProvider,
    requests: Receiver<StatRequest>,
    completions: Sender<StatCompletion>,
) {
    for request in requests {
        debug!(
            "[stat] #{} {:?} {}",
            request.ticket,
            request.purpose,
            request.path.display()
        );

        let result = provider.stat(&request.path);
        if completions
            .send(StatCompletion::for_request(request, result))
            .is_err()
        {
            break;
        }
    }

    debug!("[stat] request channel closed; worker exiting");
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
