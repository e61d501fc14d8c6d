#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use notion_tasks::clock::{FixedClock, ReferenceZone};
use notion_tasks::config::Config;
use notion_tasks::display::{Renderer, TemplateData};
use notion_tasks::error::{Error, Result};
use notion_tasks::sources::{FetchRequest, Task, TaskSource};

/// Sensible default `Config` for tests. Callers can override fields via struct update syntax.
pub fn default_test_config() -> Config {
    Config {
        notion_token: "secret-token".to_string(),
        data_source_id: "data-source-id".to_string(),
        timezone: ReferenceZone::Named(chrono_tz::UTC),
        ..Config::default()
    }
}

/// October 1, 2023, 00:30 UTC.
pub fn october_first() -> Box<FixedClock> {
    Box::new(FixedClock(
        Utc.with_ymd_and_hms(2023, 10, 1, 0, 30, 0).unwrap(),
    ))
}

pub type Frames = Arc<Mutex<Vec<(bool, Vec<Task>)>>>;

/// Records every frame handed to it.
pub struct RecordingRenderer {
    pub frames: Frames,
}

impl RecordingRenderer {
    pub fn new() -> (Self, Frames) {
        let frames = Frames::default();
        (
            Self {
                frames: Arc::clone(&frames),
            },
            frames,
        )
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, data: TemplateData<'_>) -> Result<()> {
        self.frames
            .lock()
            .unwrap()
            .push((data.loading, data.tasks.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct SourceTracker {
    pub requests: Vec<FetchRequest>,
    pub max_concurrent: usize,
}

/// Serves queued results in order, then fails every later fetch.
pub struct MockSource {
    responses: Mutex<VecDeque<Result<Vec<Task>>>>,
    delay: Duration,
    active: AtomicUsize,
    pub tracker: Arc<Mutex<SourceTracker>>,
}

impl MockSource {
    pub fn new(responses: Vec<Result<Vec<Task>>>, tracker: Arc<Mutex<SourceTracker>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: Duration::ZERO,
            active: AtomicUsize::new(0),
            tracker,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl TaskSource for MockSource {
    fn fetch_tasks(&self, request: &FetchRequest) -> Result<Vec<Task>> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.requests.push(request.clone());
            tracker.max_concurrent = tracker.max_concurrent.max(active);
        }

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::TaskSource("Notion API request failed".to_string())))
    }
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met within 5s");
}
