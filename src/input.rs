use crate::error::{Chip8Error, Result};
use crate::interpreter::Chip8Io;
use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const KEY_COUNT: usize = 16;

/// the 16 key hex keypad. only the input side presses and releases keys; the
/// interpreter only reads them
#[derive(Debug, Default)]
pub struct Keypad {
    keys: [AtomicBool; KEY_COUNT],
    lock: Mutex<()>,
    wake: Condvar,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: u8) -> Result<()> {
        self.slot(key)?.store(true, Ordering::Release);
        self.wake_all();
        Ok(())
    }

    pub fn release(&self, key: u8) -> Result<()> {
        self.slot(key)?.store(false, Ordering::Release);
        Ok(())
    }

    fn slot(&self, key: u8) -> Result<&AtomicBool> {
        self.keys
            .get(key as usize)
            .ok_or(Chip8Error::InvalidKey(key))
    }

    /// for EX9E/EXA1 the key comes out of a register, so only its low
    /// nibble counts
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[key as usize & 0xf].load(Ordering::Acquire)
    }

    /// lowest numbered key currently held
    pub fn first_pressed(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|&k| self.is_pressed(k))
    }

    /// block until a key is held, `halt` is raised or `timeout` passes.
    /// returns whether a key is held
    pub fn wait_for_press(&self, timeout: Duration, halt: &AtomicBool) -> bool {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self.wake.wait_timeout_while(guard, timeout, |_| {
            self.first_pressed().is_none() && !halt.load(Ordering::Acquire)
        });
        self.first_pressed().is_some()
    }

    /// kick anything sat in `wait_for_press` so it looks again
    pub fn wake_all(&self) {
        // taking the lock orders this against a waiter checking the keys
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.wake.notify_all();
    }
}

/// ditto using left-hand side of qwerty keyboard
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals only tell us about presses, so a key counts as held for this
/// long after its last (auto-repeated) press
pub const KEY_HOLD: Duration = Duration::from_millis(150);

/// reads keypresses
pub trait Input {
    /// move any pending key events onto the machine's keypad. returns false
    /// once the user has asked to quit
    fn update(&mut self, io: &Chip8Io) -> Result<bool>;
}

/// simple implementation of Input, reading the terminal with crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    held: [Option<Instant>; KEY_COUNT],
}

impl TermInput {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [None; KEY_COUNT],
        })
    }

    fn map_key(&self, key: char) -> Option<u8> {
        self.keymap.get(&key.to_ascii_lowercase()).copied()
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn update(&mut self, io: &Chip8Io) -> Result<bool> {
        let now = Instant::now();
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => return Ok(false),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(false)
                    }
                    KeyCode::Char(key) => match self.map_key(key) {
                        Some(mapped) => {
                            self.held[mapped as usize] = Some(now);
                            io.press_key(mapped)?;
                        }
                        None => warn!("can't map {:?} to a CHIP-8 key", key),
                    },
                    _ => {}
                }
            }
        }
        for (key, held) in self.held.iter_mut().enumerate() {
            if matches!(held, Some(at) if now.duration_since(*at) >= KEY_HOLD) {
                *held = None;
                io.release_key(key as u8)?;
            }
        }
        Ok(true)
    }
}

/// dummy Input implementation for testing: presses the given keys on the first
/// update, releases them on the second, then asks to quit
pub struct DummyInput {
    keys: Vec<u8>,
    updates: usize,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            updates: 0,
        }
    }
}

impl Input for DummyInput {
    fn update(&mut self, io: &Chip8Io) -> Result<bool> {
        self.updates += 1;
        match self.updates {
            1 => {
                for &k in &self.keys {
                    io.press_key(k)?;
                }
            }
            2 => {
                for &k in &self.keys {
                    io.release_key(k)?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
