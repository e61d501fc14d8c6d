use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::display::{Renderer, TemplateData};
use crate::error::{Error, Result};
use crate::sources::{FetchRequest, Task};

/// Everything that drives the presenter forward.
#[derive(Debug)]
pub enum Event {
    Tick,
    Fetched(Result<Vec<Task>>),
}

/// Repeating timer that posts `Event::Tick`. Aborted when stopped or dropped.
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    /// First tick fires one full `period` after arming.
    pub fn every(period: Duration, events: mpsc::UnboundedSender<Event>) -> Self {
        let first_tick = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if events.send(Event::Tick).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Build the request for one fetch cycle. `today` is computed once here and
/// used for both the remote filter and the past-due flag.
pub fn build_request(config: &Config, clock: &dyn Clock) -> FetchRequest {
    FetchRequest {
        notion_token: config.notion_token.clone(),
        data_source_id: config.data_source_id.clone(),
        fields: config.fields.clone(),
        done_statuses: config.done_statuses.clone(),
        today: config.timezone.today(clock.now()),
    }
}

/// Holds the latest task snapshot, schedules fetches and drives the renderer.
pub struct Presenter<R: Renderer> {
    config: Config,
    clock: Box<dyn Clock>,
    renderer: R,
    requests: mpsc::UnboundedSender<FetchRequest>,
    loading: bool,
    tasks: Vec<Task>,
    in_flight: bool,
    timer: Option<Timer>,
}

impl<R: Renderer> Presenter<R> {
    pub fn new(
        config: Config,
        clock: Box<dyn Clock>,
        renderer: R,
        requests: mpsc::UnboundedSender<FetchRequest>,
    ) -> Self {
        Self {
            config,
            clock,
            renderer,
            requests,
            loading: true,
            tasks: Vec::new(),
            in_flight: false,
            timer: None,
        }
    }

    /// Show the loading state, fetch immediately, then every `update_interval`.
    pub fn start(&mut self, events: mpsc::UnboundedSender<Event>) -> Result<()> {
        info!(
            update_interval_ms = self.config.update_interval,
            "starting task display"
        );
        self.redraw()?;
        self.request_fetch();
        self.timer = Some(Timer::every(
            Duration::from_millis(self.config.update_interval),
            events,
        ));
        Ok(())
    }

    /// Disarm the timer. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            debug!("update timer cancelled");
        }
    }

    pub fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Tick => {
                self.request_fetch();
                Ok(())
            }
            Event::Fetched(Ok(tasks)) => self.on_result(tasks),
            Event::Fetched(Err(e)) => {
                self.on_fetch_failed(&e);
                Ok(())
            }
        }
    }

    /// Dispatch a fetch for the current reference date. Returns `false` when
    /// the cycle is skipped because a fetch is already outstanding.
    pub fn request_fetch(&mut self) -> bool {
        if self.in_flight {
            debug!("fetch already in flight; skipping cycle");
            return false;
        }

        let request = build_request(&self.config, self.clock.as_ref());
        debug!(today = %request.today, "requesting task fetch");

        if self.requests.send(request).is_err() {
            warn!("fetch worker has stopped; cannot request tasks");
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Replace the snapshot wholesale and redraw.
    pub fn on_result(&mut self, tasks: Vec<Task>) -> Result<()> {
        info!(count = tasks.len(), "received tasks");
        self.in_flight = false;
        self.loading = false;
        self.tasks = tasks;
        self.redraw()
    }

    /// Keep the previous snapshot and wait for the next tick.
    pub fn on_fetch_failed(&mut self, error: &Error) {
        self.in_flight = false;
        warn!(error = %error, "task fetch failed; keeping previous tasks");
    }

    pub fn template_data(&self) -> TemplateData<'_> {
        TemplateData {
            loading: self.loading,
            tasks: &self.tasks,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.in_flight
    }

    fn redraw(&mut self) -> Result<()> {
        let data = TemplateData {
            loading: self.loading,
            tasks: &self.tasks,
        };
        self.renderer.render(data)
    }
}

impl<R: Renderer> Drop for Presenter<R> {
    fn drop(&mut self) {
        self.stop();
    }
}
