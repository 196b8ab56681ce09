//! Audio output: the media seam used by the playback controller and its rodio implementation

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::runtime::Handle;
use url::Url;

use crate::error::MediaError;
use crate::model::Song;

/// Opens media streams. `open` blocks and is only ever called from the blocking pool.
pub trait MediaBackend: Send + Sync + 'static {
    fn open(&self, location: &Url, song: &Song) -> Result<Box<dyn MediaHandle>, MediaError>;
}

/// One attached media resource. Dropping the handle releases the output.
pub trait MediaHandle: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Shared seek access, so a seek can run off the interactive loop
    fn seeker(&self) -> Arc<dyn Seeker>;
    /// Total length when the decoder knows it
    fn duration(&self) -> Option<Duration>;
    fn is_finished(&self) -> bool;
}

/// Repositions an attached stream. May block until the output thread applies it.
pub trait Seeker: Send + Sync {
    fn seek(&self, position: Duration) -> Result<(), MediaError>;
}

/// The process-wide audio device. Must stay alive (and on its thread) while anything plays.
pub struct AudioOutput {
    stream: OutputStream,
}

impl AudioOutput {
    pub fn open_default() -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        stream.log_on_drop(false);
        tracing::info!("Audio output opened");
        Ok(Self { stream })
    }

    pub fn mixer(&self) -> Mixer {
        self.stream.mixer().clone()
    }
}

/// Downloads the whole stream, decodes it with rodio and plays it on the shared mixer.
pub struct RodioBackend {
    http: reqwest::Client,
    runtime: Handle,
    mixer: Mixer,
}

impl RodioBackend {
    pub fn new(http: reqwest::Client, runtime: Handle, mixer: Mixer) -> Self {
        Self { http, runtime, mixer }
    }

    fn download(&self, location: &Url) -> Result<Vec<u8>, MediaError> {
        self.runtime.block_on(async {
            let response = self
                .http
                .get(location.clone())
                .send()
                .await
                .map_err(|e| MediaError::Fetch(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(MediaError::Fetch(format!("server answered {}", status)));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| MediaError::Fetch(e.to_string()))?;
            Ok::<_, MediaError>(bytes.to_vec())
        })
    }
}

impl MediaBackend for RodioBackend {
    fn open(&self, location: &Url, song: &Song) -> Result<Box<dyn MediaHandle>, MediaError> {
        tracing::debug!(song_id = song.id, location = %location, "Opening stream");

        let data = self.download(location)?;
        let byte_len = data.len();

        let source = Decoder::new(Cursor::new(data)).map_err(|e| MediaError::Decode(e.to_string()))?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        sink.append(source);

        tracing::info!(
            song_id = song.id,
            byte_len,
            duration_secs = duration.map(|d| d.as_secs()),
            "Stream decoded"
        );

        Ok(Box::new(RodioHandle {
            sink: Arc::new(sink),
            duration,
        }))
    }
}

struct RodioHandle {
    sink: Arc<Sink>,
    duration: Option<Duration>,
}

impl MediaHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn seeker(&self) -> Arc<dyn Seeker> {
        self.sink.clone()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

impl Seeker for Sink {
    fn seek(&self, position: Duration) -> Result<(), MediaError> {
        self.try_seek(position)
            .map_err(|e| MediaError::Seek(e.to_string()))
    }
}
