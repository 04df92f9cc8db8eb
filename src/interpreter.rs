//! # interpreter
//!
//! Two threads of control share one machine while it runs:
//!
//!  * the cycle driver: fetch, decode, execute, then sleep until the
//!    instruction period is up
//!  * the timer process: counts the delay and sound timers down at 60Hz
//!
//! and a third, outside the interpreter, renders the screen and feeds keys in
//! through a `Chip8Io` handle. no machine state in the handle is behind a
//! lock (the keypad's mutex only serves wake-ups). each field has one writer:
//!
//!  * screen, draw flag (set)          -- interpreter
//!  * keys, draw flag (clear)          -- front end
//!  * timers                           -- interpreter sets, timer process
//!                                        decrements, front end zeroes sound
//!  * halt                             -- anybody; nobody clears it
use crate::config::Quirks;
use crate::display::{Frame, Framebuffer};
use crate::error::{Chip8Error, Result};
use crate::input::Keypad;
use crate::instruction::{decode, Decoded, Operation};
use crate::memory::{Chip8MemoryMap, MemoryMap, CHIP8_RAM_SIZE_BYTES};
use crate::registers::{Registers, FLAG};
use crate::timer::{run_timers, Timers, TIMER_PERIOD};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Shared {
    halt: AtomicBool,
    draw: AtomicBool,
    timers: Timers,
    screen: Framebuffer,
    keypad: Keypad,
}

/// the parts of a running machine the outside world may look at or poke
#[derive(Debug, Clone, Default)]
pub struct Chip8Io(Arc<Shared>);

impl Chip8Io {
    /// stop the machine for good; it finishes the instruction it's on
    pub fn stop(&self) {
        self.0.halt.store(true, Ordering::Release);
        self.0.keypad.wake_all();
    }

    pub fn is_halted(&self) -> bool {
        self.0.halt.load(Ordering::Acquire)
    }

    /// has the screen changed since the last call
    pub fn take_draw_flag(&self) -> bool {
        self.0.draw.swap(false, Ordering::AcqRel)
    }

    pub fn frame(&self) -> Frame {
        self.0.screen.frame()
    }

    pub(crate) fn timers(&self) -> &Timers {
        &self.0.timers
    }

    pub fn sound_timer(&self) -> u8 {
        self.0.timers.sound()
    }

    pub fn reset_sound_timer(&self) {
        self.0.timers.set_sound(0);
    }

    pub fn delay_timer(&self) -> u8 {
        self.0.timers.delay()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.0.keypad
    }

    pub fn press_key(&self, key: u8) -> Result<()> {
        self.0.keypad.press(key)
    }

    pub fn release_key(&self, key: u8) -> Result<()> {
        self.0.keypad.release(key)
    }

    fn set_draw_flag(&self) {
        self.0.draw.store(true, Ordering::Release);
    }
}

/// what the cycle driver should do after an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// FX0A found no key held; the same instruction runs again next cycle
    AwaitingKey,
    Halted,
}

pub struct Chip8Interpreter {
    memory: Chip8MemoryMap,
    registers: Registers,
    quirks: Quirks,
    rng: StdRng,
    io: Chip8Io,
}

impl Chip8Interpreter {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// same as `new` but CXNN is repeatable
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: Registers::new(),
            quirks: Quirks::default(),
            rng,
            io: Chip8Io::default(),
        }
    }

    /// both quirks at once
    pub fn set_quirks(&mut self, value: bool) {
        self.quirks = Quirks::uniform(value);
    }

    pub fn set_quirk_flags(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// load a chip8 program; returns how many bytes fitted
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        let len = self.memory.load_program(reader)?;
        info!("loaded {} byte program", len);
        Ok(len)
    }

    /// load a chip8 program from a file, refusing empty ones
    pub fn load_program_file(&mut self, path: &Path) -> Result<usize> {
        info!("loading {}", path.display());
        let mut f = File::open(path)?;
        match self.load_program(&mut f)? {
            0 => Err(Chip8Error::EmptyProgram),
            len => Ok(len),
        }
    }

    /// handle for the renderer / input side
    pub fn io(&self) -> Chip8Io {
        self.io.clone()
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    /// run until halted, at one instruction per `period`, with the timers
    /// ticking alongside on their own thread
    pub fn run(&mut self, period: Duration) {
        let io = self.io.clone();
        info!("cycle started, {:?} per instruction", period);
        thread::scope(|s| {
            s.spawn(|| run_timers(&io.0.timers, &io.0.halt, TIMER_PERIOD));
            self.cycle(period);
            // make sure the timer process sees the halt too
            io.stop();
        });
        info!("cycle stopped");
    }

    fn cycle(&mut self, period: Duration) {
        loop {
            let deadline = Instant::now() + period;
            match self.step() {
                Step::Halted => break,
                Step::AwaitingKey => self.await_key(),
                Step::Continue => {}
            }
            spin_sleep::sleep(deadline.saturating_duration_since(Instant::now()));
        }
    }

    /// park until a key goes down or someone stops us, rather than spinning
    /// on FX0A
    fn await_key(&self) {
        let halt = &self.io.0.halt;
        while !halt.load(Ordering::Acquire)
            && !self.io.keypad().wait_for_press(TIMER_PERIOD, halt)
        {}
    }

    /// fetch and execute one instruction
    pub fn step(&mut self) -> Step {
        if self.io.is_halted() {
            return Step::Halted;
        }
        let pc = self.registers.pc;
        if pc as usize + 1 >= CHIP8_RAM_SIZE_BYTES {
            debug!("pc 0x{:04x} is past the end of memory, halting", pc);
            return self.halt();
        }
        let word = self.memory.get_word(pc);
        self.registers.pc = pc + 2;
        trace!("0x{:03x}: {:04x}", pc, word);
        self.execute(word)
    }

    /// execute one instruction word as if it had just been fetched
    pub fn execute(&mut self, word: u16) -> Step {
        match decode(word) {
            Decoded::Execute(op) => self.apply(op),
            Decoded::Ignore => {
                debug!("ignoring unknown instruction {:04x}", word);
                Step::Continue
            }
            Decoded::Halt => {
                debug!("unrecognised instruction {:04x}, halting", word);
                self.halt()
            }
        }
    }

    fn halt(&mut self) -> Step {
        self.io.stop();
        Step::Halted
    }

    fn apply(&mut self, op: Operation) -> Step {
        use Operation::*;

        let r = &mut self.registers;
        match op {
            Clear => {
                self.io.0.screen.clear();
                self.io.set_draw_flag();
            }
            Return => {
                if let Some(addr) = r.pop() {
                    r.pc = addr;
                }
            }
            Jump(addr) => r.pc = addr,
            Call(addr) => {
                r.push(r.pc);
                r.pc = addr;
            }
            SkipEqImm(x, nn) => {
                if r.v[x] == nn {
                    r.skip();
                }
            }
            SkipNeImm(x, nn) => {
                if r.v[x] != nn {
                    r.skip();
                }
            }
            SkipEqReg(x, y) => {
                if r.v[x] == r.v[y] {
                    r.skip();
                }
            }
            SkipNeReg(x, y) => {
                if r.v[x] != r.v[y] {
                    r.skip();
                }
            }
            LoadImm(x, nn) => r.v[x] = nn,
            // no carry out of 7XNN
            AddImm(x, nn) => r.v[x] = r.v[x].wrapping_add(nn),
            Assign(x, y) => r.v[x] = r.v[y],
            Or(x, y) => r.v[x] |= r.v[y],
            And(x, y) => r.v[x] &= r.v[y],
            Xor(x, y) => r.v[x] ^= r.v[y],
            Add(x, y) => {
                let (sum, carry) = r.v[x].overflowing_add(r.v[y]);
                r.v[x] = sum;
                r.set_flag(carry);
            }
            Sub(x, y) => {
                let no_borrow = r.v[x] >= r.v[y];
                r.v[x] = r.v[x].wrapping_sub(r.v[y]);
                r.set_flag(no_borrow);
            }
            ShiftRight(x, y) => {
                let value = r.v[if self.quirks.shift { x } else { y }];
                r.v[x] = value >> 1;
                r.v[FLAG] = value & 1;
            }
            SubN(x, y) => {
                // the flag compares against the new VX, not the operand
                r.v[x] = r.v[y].wrapping_sub(r.v[x]);
                let no_borrow = r.v[y] > r.v[x];
                r.set_flag(no_borrow);
            }
            ShiftLeft(x, y) => {
                let value = r.v[if self.quirks.shift { x } else { y }];
                r.v[x] = value << 1;
                r.v[FLAG] = value >> 7;
            }
            LoadIndex(addr) => r.i = addr,
            JumpOffset(addr) => r.pc = addr.wrapping_add(r.v[0] as u16),
            Random(x, nn) => r.v[x] = self.rng.gen::<u8>() & nn,
            Draw(x, y, n) => {
                let sprite: Vec<u8> = (0..n as u16)
                    .map(|row| self.memory.get_byte(r.i.wrapping_add(row)))
                    .collect();
                let collision =
                    self.io.0.screen.draw_sprite(r.v[x] as usize, r.v[y] as usize, &sprite);
                r.set_flag(collision);
                self.io.set_draw_flag();
            }
            SkipKeyPressed(x) => {
                if self.io.keypad().is_pressed(r.v[x]) {
                    r.skip();
                }
            }
            SkipKeyNotPressed(x) => {
                if !self.io.keypad().is_pressed(r.v[x]) {
                    r.skip();
                }
            }
            GetDelay(x) => r.v[x] = self.io.delay_timer(),
            AwaitKey(x) => match self.io.keypad().first_pressed() {
                Some(key) => r.v[x] = key,
                None => {
                    r.pc = r.pc.wrapping_sub(2);
                    return Step::AwaitingKey;
                }
            },
            SetDelay(x) => self.io.timers().set_delay(r.v[x]),
            SetSound(x) => self.io.timers().set_sound(r.v[x]),
            AddIndex(x) => r.i = r.i.wrapping_add(r.v[x] as u16),
            GlyphAddress(x) => r.i = self.memory.glyph_addr_for(r.v[x]),
            StoreBcd(x) => {
                let value = r.v[x];
                self.memory.set_byte(r.i, value / 100);
                self.memory.set_byte(r.i.wrapping_add(1), value / 10 % 10);
                self.memory.set_byte(r.i.wrapping_add(2), value % 10);
            }
            StoreRegisters(x) => {
                for reg in 0..=x {
                    self.memory.set_byte(r.i.wrapping_add(reg as u16), r.v[reg]);
                }
                if !self.quirks.load_store {
                    r.i = r.i.wrapping_add(x as u16 + 1);
                }
            }
            LoadRegisters(x) => {
                for reg in 0..=x {
                    r.v[reg] = self.memory.get_byte(r.i.wrapping_add(reg as u16));
                }
                if !self.quirks.load_store {
                    r.i = r.i.wrapping_add(x as u16 + 1);
                }
            }
        }
        Step::Continue
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
