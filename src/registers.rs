use crate::memory::CHIP8_PROGRAM_ADDR;

/// number of general purpose registers, V0 to VF
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry / borrow / collision flag
pub const FLAG: usize = 0xf;

/// register file and control state the operation handlers work on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    stack: Vec<u16>,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: Vec::new(),
        }
    }

    /// push a return address
    pub fn push(&mut self, addr: u16) {
        self.stack.push(addr);
    }

    /// pop a return address; `None` when nothing was ever called
    pub fn pop(&mut self) -> Option<u16> {
        self.stack.pop()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_flag(&mut self, on: bool) {
        self.v[FLAG] = on as u8;
    }

    /// step over the next instruction
    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
