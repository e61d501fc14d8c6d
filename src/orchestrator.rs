use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::display::Renderer;
use crate::error::{Error, Result};
use crate::presenter::{Event, Presenter, build_request};
use crate::sources::{FetchRequest, Task, TaskSource};

/// Run blocking source I/O off the event loop.
async fn fetch_blocking<S: TaskSource + 'static>(
    source: Arc<S>,
    request: FetchRequest,
) -> Result<Vec<Task>> {
    tokio::task::spawn_blocking(move || source.fetch_tasks(&request))
        .await
        .map_err(|e| Error::Orchestrator(format!("fetch task did not complete: {e}")))?
}

/// Spawn the worker that serves fetch requests one at a time and posts each
/// outcome back as `Event::Fetched`. Returns the request channel.
pub fn spawn_fetch_worker<S: TaskSource + 'static>(
    source: Arc<S>,
    events: mpsc::UnboundedSender<Event>,
) -> (mpsc::UnboundedSender<FetchRequest>, JoinHandle<()>) {
    let (requests_tx, mut requests_rx) = mpsc::unbounded_channel::<FetchRequest>();

    let handle = tokio::spawn(async move {
        while let Some(request) = requests_rx.recv().await {
            let result = fetch_blocking(Arc::clone(&source), request).await;
            if events.send(Event::Fetched(result)).is_err() {
                break;
            }
        }
        debug!("fetch worker stopped");
    });

    (requests_tx, handle)
}

pub struct Orchestrator<S> {
    source: Arc<S>,
    config: Config,
    clock: Box<dyn Clock>,
}

impl<S: TaskSource + 'static> Orchestrator<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self::with_clock(source, config, Box::new(SystemClock))
    }

    pub fn with_clock(source: S, config: Config, clock: Box<dyn Clock>) -> Self {
        Self {
            source: Arc::new(source),
            config,
            clock,
        }
    }

    /// The request the next cycle would send.
    pub fn next_request(&self) -> FetchRequest {
        build_request(&self.config, self.clock.as_ref())
    }

    /// Single fetch without scheduling. Errors propagate to the caller.
    pub async fn run_once(&self) -> Result<Vec<Task>> {
        let request = self.next_request();
        info!(today = %request.today, "fetching tasks once");
        fetch_blocking(Arc::clone(&self.source), request).await
    }

    /// Drive the presenter until `shutdown` flips to `true` or its sender is
    /// dropped. Fetch failures never end the loop.
    pub async fn run<R: Renderer>(
        self,
        renderer: R,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (requests_tx, worker) = spawn_fetch_worker(Arc::clone(&self.source), events_tx.clone());

        let mut presenter = Presenter::new(self.config, self.clock, renderer, requests_tx);
        presenter.start(events_tx)?;

        loop {
            tokio::select! {
                event = events_rx.recv() => {
                    let Some(event) = event else {
                        warn!("event channel closed");
                        break;
                    };
                    if let Err(e) = presenter.handle(event) {
                        warn!(error = %e, "failed to update display");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("shutdown requested");
                        break;
                    }
                }
            }
        }

        presenter.stop();
        drop(presenter);
        // An in-flight request is abandoned, not cancelled; its result is dropped.
        worker.abort();
        Ok(())
    }
}
