//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the core is `interpreter::Chip8Interpreter`: memory, registers, decode
//!   and execute, plus the run loop and the 60Hz timer process
//! * instructions run at a fixed period (time per instruction, not a clock
//!   frequency); the driver sleeps until each deadline rather than spinning
//! * the outside world only talks to a running machine through a
//!   `Chip8Io` handle: poll the draw flag and screen, poll the sound timer,
//!   press keys, stop
//! * abstract display, input and sound behind traits so the interpreter
//!   doesn't need to know how they work; the terminal versions use TUI,
//!   crossterm and the PC speaker
//!
//! Model
//!
//! main
//!  |-- config (quirks, period, rom)
//!  |-- interpreter(memory, registers, quirks)  -- cpu thread
//!  |    |-- instruction decode
//!  |    `-- timer process                       -- scoped thread
//!  `-- front end loop, ~60Hz
//!       |-- input.update(&io)
//!       |-- if io.take_draw_flag() { display.draw(io.frame()) }
//!       `-- buzzer.update(&io)
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod timer;

pub use config::{Config, Quirks};
pub use error::{Chip8Error, Result};
pub use interpreter::{Chip8Interpreter, Chip8Io, Step};
