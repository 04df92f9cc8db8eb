use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// a copy of the screen: one u64 per row, leftmost pixel in the top bit
pub type Frame = [u64; SCREEN_HEIGHT];

/// the 64x32 monochrome screen. the interpreter is the only writer; renderers
/// read it from their own thread, so each row is an atomic word and a reader
/// can at worst see a frame that is part way through a sprite
#[derive(Debug, Default)]
pub struct Framebuffer {
    rows: [AtomicU64; SCREEN_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        for row in &self.rows {
            row.store(0, Ordering::Release);
        }
    }

    /// XOR a sprite, one byte per row, onto the screen at (x, y). both axes
    /// wrap around. returns true if any lit pixel was switched off
    pub fn draw_sprite(&self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (line, byte) in sprite.iter().enumerate() {
            let mask = ((*byte as u64) << (64 - 8)).rotate_right((x % SCREEN_WIDTH) as u32);
            let row = &self.rows[(y + line) % SCREEN_HEIGHT];
            let old = row.fetch_xor(mask, Ordering::AcqRel);
            collision |= old & mask != 0;
        }
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        pixel(&self.frame(), x, y)
    }

    /// snapshot of the whole screen
    pub fn frame(&self) -> Frame {
        let mut frame = [0; SCREEN_HEIGHT];
        for (dst, row) in frame.iter_mut().zip(&self.rows) {
            *dst = row.load(Ordering::Acquire);
        }
        frame
    }
}

/// is the pixel at (x, y) lit
pub fn pixel(frame: &Frame, x: usize, y: usize) -> bool {
    frame[y % SCREEN_HEIGHT] & (1 << (SCREEN_WIDTH - 1 - x % SCREEN_WIDTH)) != 0
}

/// Display is used to put frames on a screen. It abstracts the implementation
/// details, so a variety of kinds of screen would work.
pub trait Display {
    /// draw a whole frame
    fn draw(&mut self, frame: &Frame) -> Result<(), io::Error>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// coords of every pixel that is (or isn't) lit, y pointing down
    fn bitplane_from_frame<'a>(
        &self,
        frame: &'a Frame,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        (0..self.0 * self.1)
            .map(move |count| (count % w, count / w))
            .filter(move |&(x, y)| pixel(frame, x, y) == lit)
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &Frame) -> Result<(), io::Error> {
        let resolution = &self.resolution;
        // 1:1 between terminal cells and chip-8 pixels, plus the border
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &resolution
                            .bitplane_from_frame(frame, false)
                            .collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution
                            .bitplane_from_frame(frame, true)
                            .collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// keeps the last frame it was given; useful for testing
#[derive(Default)]
pub struct DummyDisplay {
    pub last: Option<Frame>,
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &Frame) -> Result<(), io::Error> {
        self.last = Some(*frame);
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &Framebuffer) -> Vec<(usize, usize)> {
        let frame = fb.frame();
        (0..SCREEN_HEIGHT)
            .flat_map(|y| (0..SCREEN_WIDTH).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(&frame, x, y))
            .collect()
    }

    #[test]
    fn test_draw_byte_aligned() {
        let fb = Framebuffer::new();
        let collision = fb.draw_sprite(8, 2, &[0b10101011]);
        assert!(!collision);
        assert_eq!(fb.frame()[2], 0b10101011u64 << 48);
    }

    #[test]
    fn test_draw_unaligned_multi_line() {
        let fb = Framebuffer::new();
        fb.draw_sprite(2, 0, &[0b11000000, 0b00000001]);
        assert_eq!(lit(&fb), vec![(2, 0), (3, 0), (9, 1)]);
    }

    #[test]
    fn test_draw_wraps_columns() {
        let fb = Framebuffer::new();
        fb.draw_sprite(60, 0, &[0xff]);
        assert_eq!(
            lit(&fb),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (60, 0), (61, 0), (62, 0), (63, 0)]
        );
    }

    #[test]
    fn test_draw_wraps_rows_and_origin() {
        let fb = Framebuffer::new();
        fb.draw_sprite(64 + 1, 31, &[0x80, 0x80]);
        assert_eq!(lit(&fb), vec![(1, 0), (1, 31)]);
    }

    #[test]
    fn test_collision_and_xor() {
        let fb = Framebuffer::new();
        assert!(!fb.draw_sprite(10, 10, &[0xf0, 0x90]));
        assert!(fb.draw_sprite(10, 10, &[0xf0, 0x90]));
        assert_eq!(fb.frame(), [0; SCREEN_HEIGHT]);
    }

    #[test]
    fn test_no_collision_when_disjoint() {
        let fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xf0]);
        assert!(!fb.draw_sprite(0, 0, &[0x0f]));
        assert_eq!(fb.frame()[0], 0xffu64 << 56);
    }

    #[test]
    fn test_clear() {
        let fb = Framebuffer::new();
        fb.draw_sprite(0, 0, &[0xff; 15]);
        fb.clear();
        assert!(lit(&fb).is_empty());
        assert!(!fb.pixel(0, 0));
    }

    #[test]
    fn test_bitplanes_cover_screen() {
        let r = Resolution(SCREEN_WIDTH, SCREEN_HEIGHT);
        let mut frame = [0; SCREEN_HEIGHT];
        frame[1] = 1;
        let on: Vec<_> = r.bitplane_from_frame(&frame, true).collect();
        assert_eq!(on, vec![(63.0, -1.0)]);
        assert_eq!(r.bitplane_from_frame(&frame, false).count(), 2047);
    }

    #[test]
    fn test_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_dummy_display_keeps_frame() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut frame = [0; SCREEN_HEIGHT];
        frame[0] = 0x8000_0000_0000_0000;
        d.draw(&frame)?;
        assert_eq!(d.frames, 1);
        assert_eq!(d.last, Some(frame));
        Ok(())
    }
}
