use crate::error::{Chip8Error, Result};
use crate::interpreter::Chip8Io;
use beep::beep;
use std::time::{Duration, Instant};

pub trait Sound {
    fn beep(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

const SIMPLEBEEP_PITCH: u16 = 880; // A5

/// how long one tone lasts, however big the sound timer was
pub const TONE_DURATION: Duration = Duration::from_millis(100);

pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<()> {
        beep(SIMPLEBEEP_PITCH).map_err(|e| Chip8Error::Sound(e.to_string()))?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.is_beeping {
            beep(0).map_err(|e| Chip8Error::Sound(e.to_string()))?;
            self.is_beeping = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct Mute {}

impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// turns the sound timer into tones: when the timer goes positive a tone of
/// fixed length starts and the timer is zeroed again, so the interpreter never
/// has to silence anything itself
pub struct Buzzer<S: Sound> {
    sound: S,
    started: Option<Instant>,
    duration: Duration,
}

impl<S: Sound> Buzzer<S> {
    pub fn new(sound: S) -> Self {
        Buzzer {
            sound,
            started: None,
            duration: TONE_DURATION,
        }
    }

    pub fn is_beeping(&self) -> bool {
        self.started.is_some()
    }

    /// poll the machine's sound timer; call this from the render loop
    pub fn update(&mut self, io: &Chip8Io) -> Result<()> {
        self.update_at(io, Instant::now())
    }

    fn update_at(&mut self, io: &Chip8Io, now: Instant) -> Result<()> {
        match self.started {
            Some(at) if now.duration_since(at) >= self.duration => {
                self.sound.stop()?;
                self.started = None;
            }
            Some(_) => {}
            None if io.sound_timer() > 0 => {
                self.sound.beep()?;
                self.started = Some(now);
                io.reset_sound_timer();
            }
            None => {}
        }
        Ok(())
    }
}
