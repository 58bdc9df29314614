//! Audio seam
//!
//! The simulation never plays sound itself. Frame events are mapped to a
//! small set of cues and handed to an `AudioSink`; hosts without a device
//! use `NullAudio` and the game runs the same.

use crate::sim::{DestroyCause, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits a wall or the paddle
    Ping,
    /// Brick destroyed
    Crash,
    /// Power-up collected
    PowerUp,
    /// Ball fell past the paddle
    BallLost,
    /// Level cleared
    LevelClear,
    /// Game over
    GameOver,
}

/// Looping background track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Bgm01,
    Bgm02,
}

impl MusicTrack {
    /// Level 2 has its own track, every other level shares the first
    pub fn for_level(level: u32) -> Self {
        if level == 2 {
            Self::Bgm02
        } else {
            Self::Bgm01
        }
    }
}

/// Oscillator shape for a synthesized voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator with an exponential pitch sweep and gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Delay from cue start (seconds)
    pub offset_s: f32,
    pub duration_s: f32,
}

impl Voice {
    const fn new(
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        gain: f32,
        offset_s: f32,
        duration_s: f32,
    ) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            gain,
            offset_s,
            duration_s,
        }
    }
}

const PING: &[Voice] = &[Voice::new(Waveform::Sine, 400.0, 400.0, 0.3, 0.0, 0.1)];

const CRASH: &[Voice] = &[
    Voice::new(Waveform::Sawtooth, 100.0, 30.0, 0.4, 0.0, 0.3),
    Voice::new(Waveform::Square, 1500.0, 1500.0, 0.15, 0.0, 0.1),
];

const POWER_UP: &[Voice] = &[
    Voice::new(Waveform::Sine, 600.0, 600.0, 0.3, 0.0, 0.1),
    Voice::new(Waveform::Sine, 800.0, 800.0, 0.3, 0.06, 0.1),
    Voice::new(Waveform::Sine, 1200.0, 1200.0, 0.3, 0.12, 0.15),
];

const BALL_LOST: &[Voice] = &[Voice::new(Waveform::Sawtooth, 200.0, 30.0, 0.4, 0.0, 0.5)];

const LEVEL_CLEAR: &[Voice] = &[
    Voice::new(Waveform::Triangle, 523.25, 523.25, 0.3, 0.0, 0.2),
    Voice::new(Waveform::Triangle, 659.25, 659.25, 0.3, 0.1, 0.2),
    Voice::new(Waveform::Triangle, 783.99, 783.99, 0.3, 0.2, 0.2),
    Voice::new(Waveform::Triangle, 1046.5, 1046.5, 0.3, 0.3, 0.4),
];

const GAME_OVER: &[Voice] = &[
    Voice::new(Waveform::Square, 392.0, 392.0, 0.25, 0.0, 0.3),
    Voice::new(Waveform::Square, 349.23, 349.23, 0.25, 0.3, 0.3),
    Voice::new(Waveform::Square, 329.63, 329.63, 0.25, 0.6, 0.3),
    Voice::new(Waveform::Square, 261.63, 130.81, 0.25, 0.9, 0.8),
];

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::WallBounce(_) | GameEvent::PaddleBounce => Some(Self::Ping),
            GameEvent::BrickDestroyed {
                cause: DestroyCause::Hit,
                ..
            } => Some(Self::Crash),
            // Splash victims share the direct hit's crash
            GameEvent::BrickDestroyed {
                cause: DestroyCause::Splash,
                ..
            } => None,
            GameEvent::PowerUpCollected(_) => Some(Self::PowerUp),
            GameEvent::BallLost { .. } => Some(Self::BallLost),
            GameEvent::LevelCleared { .. } => Some(Self::LevelClear),
            GameEvent::GameOver(_) => Some(Self::GameOver),
            GameEvent::PowerUpExpired(_)
            | GameEvent::BricksDescended { .. }
            | GameEvent::LevelStarted { .. } => None,
        }
    }

    /// Synthesis recipe for backends that generate tones
    pub fn voices(self) -> &'static [Voice] {
        match self {
            Self::Ping => PING,
            Self::Crash => CRASH,
            Self::PowerUp => POWER_UP,
            Self::BallLost => BALL_LOST,
            Self::LevelClear => LEVEL_CLEAR,
            Self::GameOver => GAME_OVER,
        }
    }
}

/// Output device for sound cues
pub trait AudioSink {
    /// Play `effect` at `volume` (0.0 - 1.0, never zero)
    fn play(&mut self, effect: SoundEffect, volume: f32);

    /// Stop any current track and loop `track` from the start
    fn play_music(&mut self, _track: MusicTrack, _volume: f32) {}

    fn stop_music(&mut self) {}
}

/// Sink for hosts without an audio device
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Sink that writes each cue to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {:?} at {:.2} ({} voices)", effect, volume, effect.voices().len());
    }

    fn play_music(&mut self, track: MusicTrack, volume: f32) {
        log::debug!("music {:?} at {:.2}", track, volume);
    }

    fn stop_music(&mut self) {
        log::debug!("music stopped");
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioManager<NullAudio> {
    fn default() -> Self {
        Self::new(NullAudio)
    }
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.sink.stop_music();
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Restart the background track picked for `level`
    pub fn start_music(&mut self, level: u32) {
        if self.muted {
            return;
        }
        let vol = self.master_volume * self.music_volume;
        self.sink.play_music(MusicTrack::for_level(level), vol);
    }

    /// Play the cues for a frame's events, at most once per cue. Music
    /// restarts on every level start and stops at game over.
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        let mut played: Vec<SoundEffect> = Vec::new();
        for event in events {
            match event {
                GameEvent::LevelStarted { level } => self.start_music(*level),
                GameEvent::GameOver(_) => self.sink.stop_music(),
                _ => {}
            }
            let Some(effect) = SoundEffect::for_event(event) else {
                continue;
            };
            if !played.contains(&effect) {
                played.push(effect);
                self.play(effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameOverReason, PowerUpKind, Wall};

    #[derive(Default)]
    struct Recorder(Vec<(SoundEffect, f32)>, Vec<Option<MusicTrack>>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.push((effect, volume));
        }

        fn play_music(&mut self, track: MusicTrack, _volume: f32) {
            self.1.push(Some(track));
        }

        fn stop_music(&mut self) {
            self.1.push(None);
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::WallBounce(Wall::Top)),
            Some(SoundEffect::Ping)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BrickDestroyed {
                column: 0,
                row: 0,
                cause: DestroyCause::Hit
            }),
            Some(SoundEffect::Crash)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BrickDestroyed {
                column: 1,
                row: 0,
                cause: DestroyCause::Splash
            }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PowerUpCollected(PowerUpKind::MagnetPaddle)),
            Some(SoundEffect::PowerUp)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver(GameOverReason::OutOfLives)),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::BricksDescended { vertical_offset: 55.0 }),
            None
        );
    }

    #[test]
    fn test_every_cue_has_voices() {
        for effect in [
            SoundEffect::Ping,
            SoundEffect::Crash,
            SoundEffect::PowerUp,
            SoundEffect::BallLost,
            SoundEffect::LevelClear,
            SoundEffect::GameOver,
        ] {
            assert!(!effect.voices().is_empty());
        }
    }

    #[test]
    fn test_volume_and_mute() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Ping);
        assert_eq!(audio.sink().0, vec![(SoundEffect::Ping, 0.5)]);

        audio.set_muted(true);
        audio.play(SoundEffect::Crash);
        assert_eq!(audio.sink().0.len(), 1);
    }

    #[test]
    fn test_handle_events_dedupes_cues() {
        let mut audio = AudioManager::new(Recorder::default());
        let events = [
            GameEvent::WallBounce(Wall::Left),
            GameEvent::PaddleBounce,
            GameEvent::BrickDestroyed {
                column: 2,
                row: 1,
                cause: DestroyCause::Hit,
            },
            GameEvent::PowerUpExpired(PowerUpKind::WidenPaddle),
        ];
        audio.handle_events(&events);
        let played: Vec<SoundEffect> = audio.sink().0.iter().map(|(e, _)| *e).collect();
        assert_eq!(played, vec![SoundEffect::Ping, SoundEffect::Crash]);
    }

    #[test]
    fn test_music_follows_level() {
        assert_eq!(MusicTrack::for_level(1), MusicTrack::Bgm01);
        assert_eq!(MusicTrack::for_level(2), MusicTrack::Bgm02);
        assert_eq!(MusicTrack::for_level(3), MusicTrack::Bgm01);

        let mut audio = AudioManager::new(Recorder::default());
        audio.handle_events(&[GameEvent::LevelStarted { level: 1 }]);
        audio.handle_events(&[
            GameEvent::LevelCleared { level: 1 },
            GameEvent::LevelStarted { level: 2 },
        ]);
        // A reset on the same level restarts the track
        audio.handle_events(&[GameEvent::LevelStarted { level: 2 }]);
        audio.handle_events(&[GameEvent::GameOver(GameOverReason::BricksReachedPaddle)]);
        assert_eq!(
            audio.sink().1,
            vec![
                Some(MusicTrack::Bgm01),
                Some(MusicTrack::Bgm02),
                Some(MusicTrack::Bgm02),
                None
            ]
        );
        assert!(audio.sink().0.contains(&(SoundEffect::LevelClear, 0.8)));
    }

    #[test]
    fn test_muted_skips_music() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.handle_events(&[GameEvent::LevelStarted { level: 2 }]);
        assert_eq!(audio.sink().1, vec![None]);
    }
}
