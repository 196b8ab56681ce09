//! In-memory media backend and a controller harness for tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use url::Url;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use crate::audio::{MediaBackend, MediaHandle, Seeker};
use crate::config::AppConfig;
use crate::error::MediaError;
use crate::model::{CatalogClient, Notification, Song};
use crate::tasks::TaskRunner;

use super::{ControllerEvent, PlaybackController};

pub fn song(id: i64, duration_seconds: u32) -> Song {
    Song {
        id,
        title: format!("Song {id}"),
        artist: "Artist".into(),
        play_count: 0,
        duration_seconds,
    }
}

/// Address nothing listens on: the port is bound once and released.
pub fn closed_server_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// Collect every notification published so far.
pub fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Ok(n) = rx.try_recv() {
        seen.push(n);
    }
    seen
}

#[derive(Default)]
struct Outputs {
    active: AtomicUsize,
    max: AtomicUsize,
}

#[derive(Default)]
pub struct FakeBackend {
    outputs: Arc<Outputs>,
    failing: Mutex<HashSet<i64>>,
    duration: Mutex<Option<Duration>>,
    seeker: Arc<FakeSeeker>,
    finished: Arc<AtomicBool>,
}

impl FakeBackend {
    pub fn fail_on(&self, song_id: i64) {
        self.failing.lock().unwrap().insert(song_id);
    }

    pub fn recover(&self, song_id: i64) {
        self.failing.lock().unwrap().remove(&song_id);
    }

    pub fn set_duration(&self, duration: Option<Duration>) {
        *self.duration.lock().unwrap() = duration;
    }

    pub fn finish_all(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Handles currently producing sound
    pub fn active_outputs(&self) -> usize {
        self.outputs.active.load(Ordering::SeqCst)
    }

    /// Most handles ever producing sound at the same time
    pub fn max_outputs(&self) -> usize {
        self.outputs.max.load(Ordering::SeqCst)
    }

    /// Last seek the output accepted
    pub fn last_seek(&self) -> Option<Duration> {
        self.seeker.seeks.lock().unwrap().last().copied()
    }

    pub fn fail_seeks(&self) {
        self.seeker.failing.store(true, Ordering::SeqCst);
    }
}

impl MediaBackend for FakeBackend {
    fn open(&self, _location: &Url, song: &Song) -> Result<Box<dyn MediaHandle>, MediaError> {
        if self.failing.lock().unwrap().contains(&song.id) {
            return Err(MediaError::Decode("unsupported format".into()));
        }
        Ok(Box::new(FakeHandle {
            outputs: Arc::clone(&self.outputs),
            seeker: Arc::clone(&self.seeker),
            finished: Arc::clone(&self.finished),
            duration: *self.duration.lock().unwrap(),
            attached: false,
        }))
    }
}

#[derive(Default)]
struct FakeSeeker {
    seeks: Mutex<Vec<Duration>>,
    failing: AtomicBool,
}

impl Seeker for FakeSeeker {
    fn seek(&self, position: Duration) -> Result<(), MediaError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaError::Seek("stream is not seekable".into()));
        }
        self.seeks.lock().unwrap().push(position);
        Ok(())
    }
}

struct FakeHandle {
    outputs: Arc<Outputs>,
    seeker: Arc<FakeSeeker>,
    finished: Arc<AtomicBool>,
    duration: Option<Duration>,
    attached: bool,
}

impl FakeHandle {
    fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.outputs.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl MediaHandle for FakeHandle {
    fn play(&mut self) {
        if !self.attached {
            self.attached = true;
            let now = self.outputs.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.outputs.max.fetch_max(now, Ordering::SeqCst);
        }
    }

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.detach();
    }

    fn seeker(&self) -> Arc<dyn Seeker> {
        self.seeker.clone()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

pub struct Harness {
    pub controller: PlaybackController,
    pub backend: Arc<FakeBackend>,
    pub server: MockServer,
    events: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl Harness {
    /// Controller wired to a fake backend and a mock catalog that accepts play reports.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/play/\d+$"))
            .respond_with(|req: &Request| {
                let id: i64 = req
                    .url
                    .path()
                    .rsplit('/')
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default();
                ResponseTemplate::new(200).set_body_json(json!({
                    "id": id,
                    "title": format!("Song {id}"),
                    "artist": "Artist",
                    "playCount": 1,
                    "duration": 100,
                }))
            })
            .mount(&server)
            .await;

        let config = AppConfig {
            server_url: Url::parse(&server.uri()).unwrap(),
            ..AppConfig::default()
        };
        let catalog = CatalogClient::new(&config).unwrap();
        let backend = Arc::new(FakeBackend::default());
        let (runner, events) = TaskRunner::new();
        let controller = PlaybackController::new(catalog, backend.clone(), runner);

        Self {
            controller,
            backend,
            server,
            events,
        }
    }

    pub async fn next_event(&mut self) -> ControllerEvent {
        tokio::time::timeout(Duration::from_secs(5), self.events.recv())
            .await
            .expect("timed out waiting for a task completion")
            .expect("task channel closed")
    }

    /// Wait for the next completion and apply it.
    pub async fn pump(&mut self) {
        let event = self.next_event().await;
        self.controller.handle_event(event);
    }

    /// Apply completions until one matches `pred`, returning after it is applied.
    pub async fn pump_until<F>(&mut self, pred: F)
    where
        F: Fn(&ControllerEvent) -> bool,
    {
        loop {
            let event = self.next_event().await;
            let done = pred(&event);
            self.controller.handle_event(event);
            if done {
                return;
            }
        }
    }
}
