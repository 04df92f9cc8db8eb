use log::warn;
use std::io;
use std::io::Read;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the flat byte-addressable store the interpreter runs against
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address; bytes
    /// that would land past the end of memory are dropped
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize, io::Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let room = self.size().saturating_sub(addr as usize);
        if buf.len() > room {
            warn!(
                "image of {} bytes truncated to {} bytes at 0x{:03x}",
                buf.len(),
                room,
                addr
            );
            buf.truncate(room);
        }
        self.write(buf.as_slice(), addr, buf.len())?;
        Ok(buf.len())
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16, len: usize) -> Result<(), io::Error> {
        let bytes = self.get_rw_slice(addr, len);
        let mut d: &[u8] = data;
        d.read_exact(bytes)?;
        Ok(())
    }

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        let word = self.get_ro_slice(addr, 2);
        u16::from_be_bytes([word[0], word[1]])
    }

    /// single byte, wrapping the address into memory
    fn get_byte(&self, addr: u16) -> u8 {
        self.get_ro_slice(self.wrap(addr), 1)[0]
    }

    /// single byte, wrapping the address into memory
    fn set_byte(&mut self, addr: u16, value: u8) {
        let a = self.wrap(addr);
        self.get_rw_slice(a, 1)[0] = value;
    }

    fn wrap(&self, addr: u16) -> u16 {
        (addr as usize % self.size()) as u16
    }

    /// how many bytes are addressable
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory (heap)
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8];

    /// get a r/o slice of the underlying memory (heap)
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8];
}

/// Defines the CHIP-8 memory map
///
///   0x0000-0x004f  glyph table (16 hex digits, 5 bytes each)
///   0x0050-0x01ff  reserved
///   0x0200-0x0fff  program
///
/// chip-8 programs *should* not write below the program area
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub glyph_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> &mut [u8] {
        let a = addr as usize;
        &mut self.bytes[a..(a + len)]
    }
    fn get_ro_slice(&self, addr: u16, len: usize) -> &[u8] {
        let a = addr as usize;
        &self.bytes[a..(a + len)]
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the glyph table lives, and how tall each glyph is
pub const CHIP8_GLYPH_ADDR: u16 = 0x000;
pub const CHIP8_GLYPH_HEIGHT: u16 = 5;

impl Chip8MemoryMap {
    /// zeroed memory with the glyph table baked in
    pub fn new() -> Self {
        let mut bytes = Box::new([0u8; CHIP8_RAM_SIZE_BYTES]);
        let a = CHIP8_GLYPH_ADDR as usize;
        bytes[a..a + CHIP8_GLYPHS.len()].copy_from_slice(&CHIP8_GLYPHS);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
            glyph_addr: CHIP8_GLYPH_ADDR,
        }
    }

    /// load a CHIP-8 program at 0x200, returning how many bytes made it in
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, io::Error> {
        self.write_any(reader, self.program_addr)
    }

    /// address of the glyph for a hex digit; not bounds checked, so digits
    /// above 0xf point past the table
    pub fn glyph_addr_for(&self, digit: u8) -> u16 {
        self.glyph_addr + digit as u16 * CHIP8_GLYPH_HEIGHT
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_GLYPHS: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
