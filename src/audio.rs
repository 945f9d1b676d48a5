//! Audio playback
//!
//! Songs and the background ambience play on their own threads. A song
//! thread reports its end over a one-shot channel that the frame loop polls.
//! The background thread loops its clip until the sender of its cancel
//! channel is dropped. Both watch the shared "sound disabled" flag and stop
//! playing while it is set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::context::{BACKGROUND_SOUND, FeederContext};
use crate::error::AudioError;

/// How often playback threads check on their sound
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A decoded-or-not sound file held in memory
#[derive(Debug, Clone)]
pub struct SoundClip {
    pub path: PathBuf,
    pub bytes: Arc<[u8]>,
    /// Known length, if the backend could tell
    pub duration: Option<Duration>,
}

/// A sound that is playing
pub trait PlaybackHandle: Send {
    fn is_finished(&self) -> bool;
    fn stop(&mut self);
}

/// Where sounds actually go
pub trait AudioBackend: Send + Sync {
    fn load(&self, path: &Path) -> Result<SoundClip, AudioError>;
    fn play(&self, clip: &SoundClip, volume: f32) -> Result<Box<dyn PlaybackHandle>, AudioError>;
}

fn read_clip(path: &Path) -> Result<Arc<[u8]>, AudioError> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|e| AudioError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Plays nothing. Each clip "plays" for its length on the wall clock.
#[derive(Debug, Clone)]
pub struct SilentBackend {
    /// Length of clips whose real length is unknown
    pub clip_length: Duration,
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self {
            clip_length: Duration::from_secs(3),
        }
    }
}

struct SilentPlayback {
    ends_at: Instant,
    stopped: bool,
}

impl PlaybackHandle for SilentPlayback {
    fn is_finished(&self) -> bool {
        self.stopped || Instant::now() >= self.ends_at
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

impl AudioBackend for SilentBackend {
    fn load(&self, path: &Path) -> Result<SoundClip, AudioError> {
        Ok(SoundClip {
            path: path.to_path_buf(),
            bytes: read_clip(path)?,
            duration: None,
        })
    }

    fn play(&self, clip: &SoundClip, _volume: f32) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        let length = clip.duration.unwrap_or(self.clip_length);
        Ok(Box::new(SilentPlayback {
            ends_at: Instant::now() + length,
            stopped: false,
        }))
    }
}

#[cfg(feature = "rodio")]
pub use self::rodio_backend::{RodioBackend, RodioOutput};

#[cfg(feature = "rodio")]
mod rodio_backend {
    use std::io::Cursor;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::{AudioBackend, PlaybackHandle, SoundClip, read_clip};
    use crate::error::AudioError;

    /// Keeps the output device open; drop it last
    pub struct RodioOutput {
        _stream: OutputStream,
    }

    /// Plays through the default output device
    #[derive(Clone)]
    pub struct RodioBackend {
        handle: OutputStreamHandle,
    }

    impl RodioBackend {
        pub fn open() -> Result<(RodioOutput, Self), AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Playback(e.to_string()))?;
            Ok((RodioOutput { _stream: stream }, Self { handle }))
        }
    }

    struct RodioPlayback {
        sink: Sink,
    }

    impl PlaybackHandle for RodioPlayback {
        fn is_finished(&self) -> bool {
            self.sink.empty()
        }

        fn stop(&mut self) {
            self.sink.stop();
        }
    }

    impl AudioBackend for RodioBackend {
        fn load(&self, path: &Path) -> Result<SoundClip, AudioError> {
            let bytes = read_clip(path)?;
            let duration = Decoder::new(Cursor::new(bytes.clone()))
                .map_err(|e| AudioError::Load {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
                .total_duration();
            Ok(SoundClip {
                path: path.to_path_buf(),
                bytes,
                duration,
            })
        }

        fn play(&self, clip: &SoundClip, volume: f32) -> Result<Box<dyn PlaybackHandle>, AudioError> {
            let source = Decoder::new(Cursor::new(clip.bytes.clone()))
                .map_err(|e| AudioError::Playback(e.to_string()))?;
            let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Playback(e.to_string()))?;
            sink.set_volume(volume);
            sink.append(source);
            Ok(Box::new(RodioPlayback { sink }))
        }
    }
}

/// Every sound a feeder context names, loaded up front
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    clips: HashMap<String, SoundClip>,
}

impl SoundBank {
    pub fn load(
        context: &FeederContext,
        root: &Path,
        backend: &dyn AudioBackend,
    ) -> Result<Self, AudioError> {
        let mut clips = HashMap::new();
        for (name, rel) in &context.sounds {
            let clip = backend.load(&root.join(rel))?;
            log::debug!("Loaded sound {name} from {}", clip.path.display());
            clips.insert(name.clone(), clip);
        }
        Ok(Self { clips })
    }

    pub fn get(&self, name: &str) -> Result<&SoundClip, AudioError> {
        self.clips
            .get(name)
            .ok_or_else(|| AudioError::UnknownSound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// The running background loop
struct BackgroundLoop {
    /// Dropping this ends the loop
    cancel: Sender<()>,
    thread: JoinHandle<()>,
}

/// Audio for the whole app
pub struct AudioEngine {
    backend: Arc<dyn AudioBackend>,
    bank: SoundBank,
    disabled: Arc<AtomicBool>,
    master_volume: f32,
    background: Option<BackgroundLoop>,
    /// Songs in flight, by bird
    songs: Vec<(u32, Receiver<()>)>,
}

impl AudioEngine {
    pub fn new(backend: Arc<dyn AudioBackend>, bank: SoundBank, master_volume: f32) -> Self {
        Self {
            backend,
            bank,
            disabled: Arc::new(AtomicBool::new(false)),
            master_volume: master_volume.clamp(0.0, 1.0),
            background: None,
            songs: Vec::new(),
        }
    }

    pub fn backend(&self) -> &dyn AudioBackend {
        self.backend.as_ref()
    }

    /// Shared flag that audio threads read
    pub fn disabled_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.disabled)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    pub fn enable(&self) {
        log::info!("Sound enabled");
        self.disabled.store(false, Ordering::Relaxed);
    }

    /// Silence everything. Playing songs stop and report as finished.
    pub fn disable(&self) {
        log::info!("Sound disabled");
        self.disabled.store(true, Ordering::Relaxed);
    }

    pub fn toggle(&self) {
        if self.is_disabled() {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Start `song` for `bird`. Its end shows up in [`Self::poll_finished`].
    pub fn play_song(&mut self, bird: u32, song: &str) -> Result<(), AudioError> {
        let (done_tx, done_rx) = mpsc::channel();
        self.songs.push((bird, done_rx));
        if self.is_disabled() {
            // The bird stops singing on its own; nothing to play
            return Ok(());
        }

        let clip = self.bank.get(song)?;
        let mut handle = self.backend.play(clip, self.master_volume)?;
        let disabled = self.disabled_flag();
        thread::spawn(move || {
            while !handle.is_finished() {
                if disabled.load(Ordering::Relaxed) {
                    handle.stop();
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
            let _ = done_tx.send(());
        });
        Ok(())
    }

    /// Birds whose song ended since the last call
    pub fn poll_finished(&mut self) -> Vec<u32> {
        let mut finished = Vec::new();
        self.songs.retain(|(bird, rx)| match rx.try_recv() {
            Err(TryRecvError::Empty) => true,
            Ok(()) | Err(TryRecvError::Disconnected) => {
                finished.push(*bird);
                false
            }
        });
        finished
    }

    /// Songs still playing
    pub fn songs_in_flight(&self) -> usize {
        self.songs.len()
    }

    /// Swap in the sounds of a new context and restart the ambience
    pub fn reload(&mut self, bank: SoundBank) -> Result<(), AudioError> {
        self.bank = bank;
        self.restart_background()
    }

    /// Stop any background loop and start a fresh one
    pub fn restart_background(&mut self) -> Result<(), AudioError> {
        self.stop_background();
        let clip = self.bank.get(BACKGROUND_SOUND)?.clone();
        let (cancel, cancelled) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let disabled = self.disabled_flag();
        let volume = self.master_volume;
        let thread = thread::spawn(move || loop_background(backend, clip, volume, disabled, cancelled));
        self.background = Some(BackgroundLoop { cancel, thread });
        Ok(())
    }

    pub fn stop_background(&mut self) {
        if let Some(BackgroundLoop { cancel, thread }) = self.background.take() {
            drop(cancel);
            if thread.join().is_err() {
                log::warn!("Background audio thread panicked");
            }
        }
    }

    pub fn background_running(&self) -> bool {
        self.background.is_some()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop_background();
    }
}

fn loop_background(
    backend: Arc<dyn AudioBackend>,
    clip: SoundClip,
    volume: f32,
    disabled: Arc<AtomicBool>,
    cancelled: Receiver<()>,
) {
    // Wait one poll interval; true once the loop should end
    let wait = || match cancelled.recv_timeout(POLL_INTERVAL) {
        Err(RecvTimeoutError::Timeout) => false,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
    };

    loop {
        if disabled.load(Ordering::Relaxed) {
            if wait() {
                return;
            }
            continue;
        }

        let mut handle = match backend.play(&clip, volume) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Background sound failed: {e}");
                return;
            }
        };
        while !handle.is_finished() {
            if wait() {
                handle.stop();
                return;
            }
            if disabled.load(Ordering::Relaxed) {
                handle.stop();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::test_support::write_assets;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Silent backend that counts plays
    #[derive(Default)]
    struct CountingBackend {
        inner: SilentBackend,
        plays: AtomicUsize,
    }

    impl AudioBackend for CountingBackend {
        fn load(&self, path: &Path) -> Result<SoundClip, AudioError> {
            self.inner.load(path)
        }

        fn play(&self, clip: &SoundClip, volume: f32) -> Result<Box<dyn PlaybackHandle>, AudioError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            self.inner.play(clip, volume)
        }
    }

    fn engine(clip_ms: u64) -> (TempDir, Arc<CountingBackend>, AudioEngine) {
        let dir = TempDir::new().unwrap();
        let context = FeederContext::backyard_sunflower();
        write_assets(dir.path(), &context);
        let backend = Arc::new(CountingBackend {
            inner: SilentBackend {
                clip_length: Duration::from_millis(clip_ms),
            },
            plays: AtomicUsize::new(0),
        });
        let bank = SoundBank::load(&context, dir.path(), backend.as_ref()).unwrap();
        let engine = AudioEngine::new(backend.clone(), bank, 0.8);
        (dir, backend, engine)
    }

    fn wait_for_song(engine: &mut AudioEngine, bird: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if engine.poll_finished().contains(&bird) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_bank_needs_every_file() {
        let dir = TempDir::new().unwrap();
        let context = FeederContext::backyard_sunflower();
        let err = SoundBank::load(&context, dir.path(), &SilentBackend::default()).unwrap_err();
        assert!(matches!(err, AudioError::Load { .. }));
    }

    #[test]
    fn test_song_completion_is_reported_once() {
        let (_dir, backend, mut engine) = engine(20);
        engine.play_song(7, "Tufted Titmouse").unwrap();
        assert_eq!(engine.songs_in_flight(), 1);
        assert!(wait_for_song(&mut engine, 7));
        assert_eq!(engine.songs_in_flight(), 0);
        assert!(engine.poll_finished().is_empty());
        assert_eq!(backend.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabling_ends_songs_early() {
        let (_dir, _backend, mut engine) = engine(60_000);
        engine.play_song(3, "Northern Cardinal").unwrap();
        engine.disable();
        assert!(wait_for_song(&mut engine, 3));
    }

    #[test]
    fn test_muted_song_does_not_play() {
        let (_dir, backend, mut engine) = engine(20);
        engine.disable();
        engine.play_song(4, "Downy Woodpecker").unwrap();
        assert!(wait_for_song(&mut engine, 4));
        assert_eq!(backend.plays.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_song_is_an_error() {
        let (_dir, _backend, mut engine) = engine(20);
        assert!(matches!(
            engine.play_song(1, "Blue Jay"),
            Err(AudioError::UnknownSound(_))
        ));
    }

    #[test]
    fn test_background_loops_until_cancelled() {
        let (_dir, backend, mut engine) = engine(5);
        engine.restart_background().unwrap();
        assert!(engine.background_running());

        let deadline = Instant::now() + Duration::from_secs(5);
        while backend.plays.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(backend.plays.load(Ordering::SeqCst) >= 3);

        engine.stop_background();
        assert!(!engine.background_running());
        let after = backend.plays.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(backend.plays.load(Ordering::SeqCst), after);
    }

    #[test]
    fn test_toggle_flips_shared_flag() {
        let (_dir, _backend, engine) = engine(5);
        let flag = engine.disabled_flag();
        engine.toggle();
        assert!(flag.load(Ordering::Relaxed));
        engine.toggle();
        assert!(!engine.is_disabled());
    }
}
