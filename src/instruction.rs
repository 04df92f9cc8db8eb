//! # instruction
//!
//! Every CHIP-8 instruction is one big-endian 16-bit word:
//!
//!   bits 15-12  opcode (primary selector)
//!   bits 11-8   X register
//!   bits  7-4   Y register
//!   bits  3-0   N nibble (secondary selector for group 0x8)
//!   bits  7-0   NN byte  (secondary selector for groups 0xE and 0xF)
//!   bits 11-0   NNN address
//!
//! decoding is a two-level lookup: the opcode picks a group, and groups
//! 0x0, 0x8, 0xE and 0xF then look at their secondary selector. The two
//! levels fail differently. An unknown form in group 0x0 halts the machine;
//! an unknown selector inside 0x8/0xE/0xF is ignored and the cycle carries on.

/// raw bit-fields of an instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub opcode: u8,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl From<u16> for Fields {
    fn from(word: u16) -> Self {
        Fields {
            opcode: (word >> 12) as u8,
            x: ((word >> 8) & 0xf) as usize,
            y: ((word >> 4) & 0xf) as usize,
            n: (word & 0xf) as u8,
            nn: (word & 0xff) as u8,
            nnn: word & 0xfff,
        }
    }
}

/// one executable operation with its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(usize, u8),
    /// 4XNN
    SkipNeImm(usize, u8),
    /// 5XY0 (N is not checked)
    SkipEqReg(usize, usize),
    /// 6XNN
    LoadImm(usize, u8),
    /// 7XNN
    AddImm(usize, u8),
    /// 8XY0
    Assign(usize, usize),
    /// 8XY1
    Or(usize, usize),
    /// 8XY2
    And(usize, usize),
    /// 8XY3
    Xor(usize, usize),
    /// 8XY4
    Add(usize, usize),
    /// 8XY5
    Sub(usize, usize),
    /// 8XY6
    ShiftRight(usize, usize),
    /// 8XY7
    SubN(usize, usize),
    /// 8XYE
    ShiftLeft(usize, usize),
    /// 9XY0 (N is not checked)
    SkipNeReg(usize, usize),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(usize, u8),
    /// DXYN
    Draw(usize, usize, u8),
    /// EX9E
    SkipKeyPressed(usize),
    /// EXA1
    SkipKeyNotPressed(usize),
    /// FX07
    GetDelay(usize),
    /// FX0A
    AwaitKey(usize),
    /// FX15
    SetDelay(usize),
    /// FX18
    SetSound(usize),
    /// FX1E
    AddIndex(usize),
    /// FX29
    GlyphAddress(usize),
    /// FX33
    StoreBcd(usize),
    /// FX55
    StoreRegisters(usize),
    /// FX65
    LoadRegisters(usize),
}

/// outcome of decoding a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Execute(Operation),
    /// unknown sub-selector in group 0x8, 0xE or 0xF
    Ignore,
    /// unknown form in group 0x0
    Halt,
}

/// decode a word into the operation it names
pub fn decode(word: u16) -> Decoded {
    use Operation::*;

    let f = Fields::from(word);
    let (x, y) = (f.x, f.y);
    let op = match f.opcode {
        0x0 => return decode_system(word),
        0x1 => Jump(f.nnn),
        0x2 => Call(f.nnn),
        0x3 => SkipEqImm(x, f.nn),
        0x4 => SkipNeImm(x, f.nn),
        0x5 => SkipEqReg(x, y),
        0x6 => LoadImm(x, f.nn),
        0x7 => AddImm(x, f.nn),
        0x8 => match f.n {
            0x0 => Assign(x, y),
            0x1 => Or(x, y),
            0x2 => And(x, y),
            0x3 => Xor(x, y),
            0x4 => Add(x, y),
            0x5 => Sub(x, y),
            0x6 => ShiftRight(x, y),
            0x7 => SubN(x, y),
            0xe => ShiftLeft(x, y),
            _ => return Decoded::Ignore,
        },
        0x9 => SkipNeReg(x, y),
        0xa => LoadIndex(f.nnn),
        0xb => JumpOffset(f.nnn),
        0xc => Random(x, f.nn),
        0xd => Draw(x, y, f.n),
        0xe => match f.nn {
            0x9e => SkipKeyPressed(x),
            0xa1 => SkipKeyNotPressed(x),
            _ => return Decoded::Ignore,
        },
        0xf => match f.nn {
            0x07 => GetDelay(x),
            0x0a => AwaitKey(x),
            0x15 => SetDelay(x),
            0x18 => SetSound(x),
            0x1e => AddIndex(x),
            0x29 => GlyphAddress(x),
            0x33 => StoreBcd(x),
            0x55 => StoreRegisters(x),
            0x65 => LoadRegisters(x),
            _ => return Decoded::Ignore,
        },
        _ => return Decoded::Halt,
    };
    Decoded::Execute(op)
}

/// group 0x0 only knows two whole words; machine code calls (0NNN) are not
/// supported so anything else stops the machine
fn decode_system(word: u16) -> Decoded {
    match word {
        0x00e0 => Decoded::Execute(Operation::Clear),
        0x00ee => Decoded::Execute(Operation::Return),
        _ => Decoded::Halt,
    }
}

#[cfg(test)]
mod tests {
    use super::Operation::*;
    use super::*;

    #[test]
    fn test_fields() {
        let f = Fields::from(0xd7b3);
        assert_eq!(f.opcode, 0xd);
        assert_eq!(f.x, 0x7);
        assert_eq!(f.y, 0xb);
        assert_eq!(f.n, 0x3);
        assert_eq!(f.nn, 0xb3);
        assert_eq!(f.nnn, 0x7b3);
    }

    #[test]
    fn test_fields_every_word() {
        for word in 0..=u16::MAX {
            let f = Fields::from(word);
            let [hi, lo] = word.to_be_bytes();
            assert_eq!(f.opcode, hi >> 4, "{:04x}", word);
            assert_eq!(f.x, (hi & 0xf) as usize, "{:04x}", word);
            assert_eq!(f.y, (lo >> 4) as usize, "{:04x}", word);
            assert_eq!(f.n, lo & 0xf, "{:04x}", word);
            assert_eq!(f.nn, lo, "{:04x}", word);
            assert_eq!(f.nnn, u16::from_be_bytes([hi & 0xf, lo]), "{:04x}", word);
            let nibbles = [f.opcode, f.x as u8, f.y as u8, f.n];
            let rebuilt = nibbles.iter().fold(0u16, |w, &b| w << 4 | b as u16);
            assert_eq!(rebuilt, word);
        }
    }

    #[test]
    fn test_decode_primary() {
        assert_eq!(decode(0xa2f0), Decoded::Execute(LoadIndex(0x2f0)));
        assert_eq!(decode(0x1234), Decoded::Execute(Jump(0x234)));
        assert_eq!(decode(0x2456), Decoded::Execute(Call(0x456)));
        assert_eq!(decode(0x342a), Decoded::Execute(SkipEqImm(4, 0x2a)));
        assert_eq!(decode(0x4a75), Decoded::Execute(SkipNeImm(0xa, 0x75)));
        assert_eq!(decode(0x5ae0), Decoded::Execute(SkipEqReg(0xa, 0xe)));
        assert_eq!(decode(0x63f5), Decoded::Execute(LoadImm(3, 0xf5)));
        assert_eq!(decode(0x7b12), Decoded::Execute(AddImm(0xb, 0x12)));
        assert_eq!(decode(0x9990), Decoded::Execute(SkipNeReg(9, 9)));
        assert_eq!(decode(0xbabc), Decoded::Execute(JumpOffset(0xabc)));
        assert_eq!(decode(0xc5af), Decoded::Execute(Random(5, 0xaf)));
        assert_eq!(decode(0xd7b0), Decoded::Execute(Draw(7, 0xb, 0)));
    }

    #[test]
    fn test_decode_alu_group() {
        assert_eq!(decode(0x8590), Decoded::Execute(Assign(5, 9)));
        assert_eq!(decode(0x8101), Decoded::Execute(Or(1, 0)));
        assert_eq!(decode(0x8642), Decoded::Execute(And(6, 4)));
        assert_eq!(decode(0x87f3), Decoded::Execute(Xor(7, 0xf)));
        assert_eq!(decode(0x8264), Decoded::Execute(Add(2, 6)));
        assert_eq!(decode(0x8c45), Decoded::Execute(Sub(0xc, 4)));
        assert_eq!(decode(0x8106), Decoded::Execute(ShiftRight(1, 0)));
        assert_eq!(decode(0x86d7), Decoded::Execute(SubN(6, 0xd)));
        assert_eq!(decode(0x8e0e), Decoded::Execute(ShiftLeft(0xe, 0)));
    }

    #[test]
    fn test_decode_key_and_misc_groups() {
        assert_eq!(decode(0xe49e), Decoded::Execute(SkipKeyPressed(4)));
        assert_eq!(decode(0xeca1), Decoded::Execute(SkipKeyNotPressed(0xc)));
        assert_eq!(decode(0xf907), Decoded::Execute(GetDelay(9)));
        assert_eq!(decode(0xfd0a), Decoded::Execute(AwaitKey(0xd)));
        assert_eq!(decode(0xf315), Decoded::Execute(SetDelay(3)));
        assert_eq!(decode(0xf718), Decoded::Execute(SetSound(7)));
        assert_eq!(decode(0xf91e), Decoded::Execute(AddIndex(9)));
        assert_eq!(decode(0xff29), Decoded::Execute(GlyphAddress(0xf)));
        assert_eq!(decode(0xf533), Decoded::Execute(StoreBcd(5)));
        assert_eq!(decode(0xf655), Decoded::Execute(StoreRegisters(6)));
        assert_eq!(decode(0xf265), Decoded::Execute(LoadRegisters(2)));
    }

    #[test]
    fn test_system_group_halts_on_unknown_form() {
        assert_eq!(decode(0x00e0), Decoded::Execute(Clear));
        assert_eq!(decode(0x00ee), Decoded::Execute(Return));
        assert_eq!(decode(0x0000), Decoded::Halt);
        assert_eq!(decode(0x0123), Decoded::Halt);
        assert_eq!(decode(0x01e0), Decoded::Halt);
    }

    #[test]
    fn test_unknown_sub_selector_is_ignored() {
        for word in [0x8128, 0x812f, 0xe100, 0xe19f, 0xf100, 0xf1ff, 0xf130] {
            assert_eq!(decode(word), Decoded::Ignore, "word {:04x}", word);
        }
    }
}
