//! Audio playback for network-synthesized speech via `rodio`.
//!
//! The media URL is downloaded up front (so a dead CDN counts as a provider
//! failure and triggers failover), then decoded and played on a blocking
//! task that owns the output stream.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use url::Url;

use crate::backend::AudioHandle;
use crate::backend::network::transport_error;
use crate::error::{UpstreamKind, VoiceError};

/// Turns a media URL into a playable [`AudioHandle`].
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Whether an output device is present.
    fn is_available(&self) -> bool;

    async fn load(&self, url: &Url) -> Result<Box<dyn AudioHandle>, VoiceError>;
}

/// [`AudioPlayer`] that downloads with `reqwest` and plays with `rodio`.
pub struct RodioAudioPlayer {
    client: reqwest::Client,
    timeout: Duration,
}

impl RodioAudioPlayer {
    pub fn new(timeout: Duration) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| VoiceError::Configuration(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl AudioPlayer for RodioAudioPlayer {
    fn is_available(&self) -> bool {
        OutputStream::try_default().is_ok()
    }

    async fn load(&self, url: &Url) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoiceError::Upstream {
                status: status.as_u16(),
                kind: UpstreamKind::from_status(status.as_u16()),
                message: format!("audio download from {url} failed"),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, self.timeout))?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Downloaded speech audio");

        Ok(Box::new(RodioHandle::new(bytes.to_vec())))
    }
}

/// One downloaded clip, playable once.
pub struct RodioHandle {
    bytes: Mutex<Option<Vec<u8>>>,
    /// Sink of the running playback, published by the blocking task.
    sink: Arc<Mutex<Option<Arc<Sink>>>>,
    paused: Arc<AtomicBool>,
}

impl RodioHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
            sink: Arc::new(Mutex::new(None)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl AudioHandle for RodioHandle {
    async fn play(&self) -> Result<(), VoiceError> {
        let Some(bytes) = self
            .bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return Err(VoiceError::Playback("audio handle already played".to_string()));
        };

        let slot = Arc::clone(&self.sink);
        let paused = Arc::clone(&self.paused);

        // OutputStream is !Send, so it lives and dies on the blocking thread.
        tokio::task::spawn_blocking(move || -> Result<(), VoiceError> {
            let (_stream, handle) =
                OutputStream::try_default().map_err(|e| VoiceError::Unsupported(e.to_string()))?;
            let sink = Sink::try_new(&handle).map_err(|e| VoiceError::Playback(e.to_string()))?;
            let source =
                Decoder::new(Cursor::new(bytes)).map_err(|e| VoiceError::Playback(e.to_string()))?;
            sink.append(source);

            let sink = Arc::new(sink);
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&sink));
            if paused.load(Ordering::SeqCst) {
                sink.stop();
            }

            sink.sleep_until_end();
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            tracing::debug!("Speech audio finished");
            Ok(())
        })
        .await
        .map_err(|e| VoiceError::Playback(format!("playback task failed: {e}")))?
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        if let Some(sink) = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            sink.stop();
        }
    }
}
