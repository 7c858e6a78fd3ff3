//! Alert beeps played on a dedicated audio thread

use anyhow::{Context, Result};
use rodio::source::{SineWave, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::mpsc::{channel, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::ui::AlertSound;

const SAMPLE_RATE: u32 = 44100;

/// Tone sequence: `count` beeps of `tone` separated by `gap`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeepPattern {
    pub frequency: f32,
    pub tone: Duration,
    pub gap: Duration,
    pub count: u32,
    /// Amplitude, 0.0 to 1.0
    pub volume: f32,
}

impl Default for BeepPattern {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            tone: Duration::from_millis(300),
            gap: Duration::from_millis(150),
            count: 2,
            volume: 0.3,
        }
    }
}

impl BeepPattern {
    /// Total playing time
    pub fn duration(&self) -> Duration {
        self.tone * self.count + self.gap * self.count.saturating_sub(1)
    }
}

/// Output stream and sink; not `Send`, so it lives on the audio thread
struct AudioPlayer {
    // Dropping the stream stops all audio
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl AudioPlayer {
    fn new() -> Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().context("Failed to open audio output stream")?;
        let sink = Sink::try_new(&stream_handle).context("Failed to create audio sink")?;
        Ok(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    fn play(&self, pattern: &BeepPattern) {
        log::debug!("Playing alert beeps ({:?})", pattern.duration());
        for i in 0..pattern.count {
            if i > 0 {
                self.sink
                    .append(Zero::<f32>::new(1, SAMPLE_RATE).take_duration(pattern.gap));
            }
            let tone = SineWave::new(pattern.frequency)
                .take_duration(pattern.tone)
                .amplify(pattern.volume.clamp(0.0, 1.0));
            self.sink.append(tone);
        }
        self.sink.play();
    }
}

enum AudioCommand {
    Play(BeepPattern),
    Shutdown,
}

/// Handle to the audio thread
pub struct AlertBeeper {
    pattern: BeepPattern,
    sender: Option<Sender<AudioCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl AlertBeeper {
    /// Start the audio thread.
    ///
    /// A missing audio device is not an error here: the thread logs it and
    /// exits, and later alerts are silent.
    pub fn spawn(pattern: BeepPattern) -> Result<Self> {
        let (tx, rx) = channel::<AudioCommand>();
        let handle = std::thread::Builder::new()
            .name("alert-audio".to_string())
            .spawn(move || {
                let player = match AudioPlayer::new() {
                    Ok(p) => p,
                    Err(e) => {
                        log::warn!("Alert sound unavailable: {:#}", e);
                        return;
                    }
                };
                while let Ok(command) = rx.recv() {
                    match command {
                        AudioCommand::Play(pattern) => player.play(&pattern),
                        AudioCommand::Shutdown => break,
                    }
                }
                player.sink.stop();
                log::debug!("Audio thread stopped");
            })
            .context("Failed to spawn audio thread")?;

        Ok(Self {
            pattern,
            sender: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn shutdown(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(AudioCommand::Shutdown);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Audio thread panicked");
            }
        }
    }
}

impl AlertSound for AlertBeeper {
    fn play_alert(&mut self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        if sender.send(AudioCommand::Play(self.pattern)).is_err() {
            log::debug!("Audio thread gone, alert is silent");
        }
    }
}

impl Drop for AlertBeeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Alert sink for runs without sound
#[derive(Debug, Default)]
pub struct SilentAlert;

impl AlertSound for SilentAlert {
    fn play_alert(&mut self) {
        log::debug!("Alert (sound disabled)");
    }
}
