//! Integration tests for `SpeechOutputDispatcher` failover and interruption.
//!
//! Providers here are in-memory fakes that count calls, plus the real
//! on-device provider over a logging engine. No audio device or network
//! access is required.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use habitvox_voice::{
    AudioHandle, HandleBasedProvider, OnDeviceProvider, SelfManagedProvider,
    SpeechOutputDispatcher, SpeechProvider, SynthesisEngine, Utterance, UtteranceCallbacks,
    VoiceError, VoiceInfo,
};
use tokio::sync::Notify;
use tokio::time::Instant;

// ── Fake providers ─────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Succeed,
    /// The synthesis request fails.
    FailPrepare,
    /// Synthesis works but the audio will not play.
    FailPlay,
    /// Play until paused.
    Hang,
}

struct FakeHandle {
    behaviour: Behaviour,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicUsize>,
    wake: Notify,
}

#[async_trait]
impl AudioHandle for FakeHandle {
    async fn play(&self) -> Result<(), VoiceError> {
        self.playing.store(true, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed | Behaviour::FailPrepare => Ok(()),
            Behaviour::FailPlay => Err(VoiceError::Playback("decoder error".into())),
            Behaviour::Hang => {
                self.wake.notified().await;
                Ok(())
            }
        }
    }

    fn pause(&self) {
        self.paused.fetch_add(1, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

struct FakeNetwork {
    name: &'static str,
    behaviour: Behaviour,
    prepares: AtomicUsize,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicUsize>,
}

impl FakeNetwork {
    fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            name,
            behaviour,
            prepares: AtomicUsize::new(0),
            playing: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn prepares(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandleBasedProvider for FakeNetwork {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn prepare(&self, _text: &str) -> Result<Box<dyn AudioHandle>, VoiceError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        if self.behaviour == Behaviour::FailPrepare {
            return Err(VoiceError::Upstream {
                status: 429,
                kind: habitvox_voice::UpstreamKind::RateLimited,
                message: format!("{} quota exceeded", self.name),
            });
        }
        Ok(Box::new(FakeHandle {
            behaviour: self.behaviour,
            playing: Arc::clone(&self.playing),
            paused: Arc::clone(&self.paused),
            wake: Notify::new(),
        }))
    }
}

struct FakeOnDevice {
    name: &'static str,
    fail: bool,
    spoken: Mutex<Vec<String>>,
    stops: AtomicUsize,
}

impl FakeOnDevice {
    fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail,
            spoken: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SelfManagedProvider for FakeOnDevice {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn speak(&self, text: &str, callbacks: UtteranceCallbacks) -> Result<(), VoiceError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            callbacks.on_error(VoiceError::Synthesis("voice unavailable".into()));
        } else {
            callbacks.on_complete();
        }
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

fn network(p: &Arc<FakeNetwork>) -> SpeechProvider {
    SpeechProvider::HandleBased(p.clone())
}

fn on_device(p: &Arc<FakeOnDevice>) -> SpeechProvider {
    SpeechProvider::SelfManaged(p.clone())
}

// ── Failover ───────────────────────────────────────────────────────

#[tokio::test]
async fn failing_provider_fails_over_exactly_once() {
    let primary = FakeNetwork::new("network", Behaviour::FailPrepare);
    let fallback = FakeOnDevice::new("on-device", false);
    let switches = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&switches);

    let dispatcher = SpeechOutputDispatcher::new(vec![network(&primary), on_device(&fallback)], None)
        .with_switch_observer(move |from, to| {
            seen.lock().unwrap().push((from.to_string(), to.to_string()));
        });

    tokio_test::assert_ok!(dispatcher.speak("Did you drink water?").await);

    assert_eq!(primary.prepares(), 1);
    assert_eq!(fallback.spoken.lock().unwrap().as_slice(), ["Did you drink water?"]);
    assert_eq!(dispatcher.active_provider(), Some("on-device"));
    assert_eq!(
        switches.lock().unwrap().as_slice(),
        [("network".to_string(), "on-device".to_string())]
    );
    assert!(!dispatcher.is_playing());
}

#[tokio::test]
async fn second_failure_is_returned_without_a_third_attempt() {
    let first = FakeNetwork::new("a", Behaviour::FailPrepare);
    let second = FakeOnDevice::new("b", true);
    let third = FakeNetwork::new("c", Behaviour::Succeed);

    let dispatcher = SpeechOutputDispatcher::new(
        vec![network(&first), on_device(&second), network(&third)],
        None,
    );

    let err = dispatcher.speak("hello").await.unwrap_err();
    assert_eq!(err, VoiceError::Synthesis("voice unavailable".into()));
    assert_eq!(first.prepares(), 1);
    assert_eq!(second.spoken.lock().unwrap().len(), 1);
    assert_eq!(third.prepares(), 0);
    assert!(!dispatcher.is_playing());
}

#[tokio::test]
async fn failover_wraps_around_from_the_last_provider() {
    let first = FakeNetwork::new("a", Behaviour::Succeed);
    let last = FakeNetwork::new("b", Behaviour::FailPrepare);

    let dispatcher = SpeechOutputDispatcher::new(vec![network(&first), network(&last)], Some("b"));

    tokio_test::assert_ok!(dispatcher.speak("hello").await);
    assert_eq!(last.prepares(), 1);
    assert_eq!(first.prepares(), 1);
    assert_eq!(dispatcher.active_provider(), Some("a"));

    // The switched-to provider stays active for the next call.
    tokio_test::assert_ok!(dispatcher.speak("again").await);
    assert_eq!(last.prepares(), 1);
    assert_eq!(first.prepares(), 2);
}

#[tokio::test]
async fn playback_error_on_handle_also_fails_over() {
    let bad_audio = FakeNetwork::new("network", Behaviour::FailPlay);
    let fallback = FakeOnDevice::new("on-device", false);

    let dispatcher =
        SpeechOutputDispatcher::new(vec![network(&bad_audio), on_device(&fallback)], None);

    tokio_test::assert_ok!(dispatcher.speak("hi").await);
    assert_eq!(bad_audio.prepares(), 1);
    assert_eq!(fallback.spoken.lock().unwrap().len(), 1);
}

// ── Rejection without provider calls ───────────────────────────────

#[tokio::test]
async fn empty_text_is_rejected_without_provider_calls() {
    let provider = FakeNetwork::new("network", Behaviour::Succeed);
    let dispatcher = SpeechOutputDispatcher::new(vec![network(&provider)], None);

    assert_eq!(dispatcher.speak("").await, Err(VoiceError::EmptyText));
    assert_eq!(dispatcher.speak("   ").await, Err(VoiceError::EmptyText));
    assert_eq!(provider.prepares(), 0);
}

#[tokio::test]
async fn no_providers_is_rejected() {
    let dispatcher = SpeechOutputDispatcher::new(Vec::new(), Some("network"));
    assert_eq!(dispatcher.speak("hello").await, Err(VoiceError::NoProviders));
    assert_eq!(dispatcher.active_provider(), None);
}

// ── Interruption ───────────────────────────────────────────────────

async fn wait_until_playing(provider: &FakeNetwork) {
    while !provider.playing.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn stop_interrupts_without_failover() {
    let slow = FakeNetwork::new("network", Behaviour::Hang);
    let fallback = FakeOnDevice::new("on-device", false);
    let dispatcher = Arc::new(SpeechOutputDispatcher::new(
        vec![network(&slow), on_device(&fallback)],
        None,
    ));

    let speaking = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("a long sentence").await }
    });

    wait_until_playing(&slow).await;
    assert!(dispatcher.is_playing());
    dispatcher.stop();

    assert_eq!(speaking.await.unwrap(), Ok(()));
    assert_eq!(slow.paused.load(Ordering::SeqCst), 1);
    assert!(fallback.spoken.lock().unwrap().is_empty());
    assert_eq!(dispatcher.active_provider(), Some("network"));
    assert!(!dispatcher.is_playing());
}

#[tokio::test]
async fn new_speak_cancels_the_previous_one() {
    let slow = FakeNetwork::new("network", Behaviour::Hang);
    let dispatcher = Arc::new(SpeechOutputDispatcher::new(vec![network(&slow)], None));

    let first = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("first").await }
    });
    wait_until_playing(&slow).await;
    slow.playing.store(false, Ordering::SeqCst);

    let second = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("second").await }
    });

    assert_eq!(first.await.unwrap(), Ok(()));
    wait_until_playing(&slow).await;
    assert_eq!(slow.paused.load(Ordering::SeqCst), 1);
    assert!(dispatcher.is_playing());

    dispatcher.stop();
    assert_eq!(second.await.unwrap(), Ok(()));
    assert_eq!(slow.prepares(), 2);
}

#[tokio::test]
async fn finished_self_managed_utterance_is_not_stopped() {
    let engine = FakeOnDevice::new("on-device", false);
    let dispatcher = SpeechOutputDispatcher::new(vec![on_device(&engine)], None);

    tokio_test::assert_ok!(dispatcher.speak("hi").await);
    // Finished utterances are not stopped again.
    dispatcher.stop();
    assert_eq!(engine.stops.load(Ordering::SeqCst), 0);
}

// ── On-device provider behind the dispatcher ───────────────────────

/// Engine that speaks for one second unless cancelled, logging every call
/// with its offset in milliseconds.
struct LogEngine {
    started: Instant,
    log: Mutex<Vec<(u128, String)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    cancelled: Notify,
}

impl LogEngine {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            log: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            cancelled: Notify::new(),
        })
    }

    fn record(&self, entry: String) {
        let at = self.started.elapsed().as_millis();
        self.log.lock().unwrap().push((at, entry));
    }

    fn spoken(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e)| e.starts_with("speak "))
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl SynthesisEngine for LogEngine {
    async fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        Ok(Vec::new())
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), VoiceError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.record(format!("speak {}", utterance.text));
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(1)) => self.record(format!("end {}", utterance.text)),
            () = self.cancelled.notified() => self.record(format!("cut {}", utterance.text)),
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&self) {
        self.record("cancel".to_string());
        self.cancelled.notify_waiters();
    }
}

fn engine_dispatcher(engine: &Arc<LogEngine>) -> Arc<SpeechOutputDispatcher> {
    let provider = OnDeviceProvider::new(Some(engine.clone() as Arc<dyn SynthesisEngine>));
    Arc::new(SpeechOutputDispatcher::new(
        vec![SpeechProvider::self_managed(provider)],
        None,
    ))
}

#[tokio::test(start_paused = true)]
async fn stop_during_settle_keeps_the_utterance_from_starting() {
    let engine = LogEngine::new();
    let dispatcher = engine_dispatcher(&engine);

    let speaking = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("A").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    dispatcher.stop();

    assert_eq!(speaking.await.unwrap(), Ok(()));
    assert!(engine.started.elapsed() < Duration::from_secs(1));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(engine.spoken().is_empty(), "log: {:?}", engine.log.lock().unwrap());
    assert!(!dispatcher.is_playing());
}

#[tokio::test(start_paused = true)]
async fn overlapping_speaks_reach_the_engine_one_at_a_time() {
    let engine = LogEngine::new();
    let dispatcher = engine_dispatcher(&engine);

    let first = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("A").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = tokio::spawn({
        let dispatcher = Arc::clone(&dispatcher);
        async move { dispatcher.speak("B").await }
    });

    assert_eq!(first.await.unwrap(), Ok(()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.spoken(), ["speak B"]);
    assert!(dispatcher.is_playing());

    dispatcher.stop();
    assert_eq!(second.await.unwrap(), Ok(()));
    assert_eq!(engine.max_active.load(Ordering::SeqCst), 1);
    assert!(!dispatcher.is_playing());
}
