use chip8_vm::display::{Display, MonoTermDisplay};
use chip8_vm::input::{Input, TermInput};
use chip8_vm::sound::{Buzzer, Mute, SimpleBeep, Sound};
use chip8_vm::{Chip8Interpreter, Chip8Io, Config};
use clap::Parser;
use log::info;
use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

/// how often the front end looks at the machine
const FRAME_PERIOD: Duration = Duration::from_nanos(1_000_000_000 / 60);

fn main() -> Result<(), Box<dyn Error>> {
    // stderr, so redirect it if you want to read it alongside the screen
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Config::parse();

    // initialise
    let mut interpreter = Chip8Interpreter::new();
    interpreter.set_quirk_flags(config.quirks());
    interpreter.load_program_file(&config.rom)?;
    let io = interpreter.io();

    let period = config.period();
    let cpu = thread::spawn(move || interpreter.run(period));

    let result = if config.mute {
        front_end(&io, Mute::new())
    } else {
        front_end(&io, SimpleBeep::new())
    };
    io.stop();
    cpu.join().map_err(|_| "cpu thread panicked")?;
    result?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..2 {
        println!();
    }
    Ok(())
}

/// draw, beep and read keys until the user quits. a halted machine stays on
/// screen until then
fn front_end<S: Sound>(io: &Chip8Io, sound: S) -> Result<(), Box<dyn Error>> {
    let mut display = MonoTermDisplay::new()?;
    let mut input = TermInput::new()?;
    let mut buzzer = Buzzer::new(sound);
    let mut reported_halt = false;

    display.draw(&io.frame())?;
    let mut next = Instant::now();
    while input.update(io)? {
        if io.take_draw_flag() {
            display.draw(&io.frame())?;
        }
        buzzer.update(io)?;
        if io.is_halted() && !reported_halt {
            info!("machine halted; esc to quit");
            reported_halt = true;
        }
        next += FRAME_PERIOD;
        spin_sleep::sleep(next.saturating_duration_since(Instant::now()));
    }
    Ok(())
}
