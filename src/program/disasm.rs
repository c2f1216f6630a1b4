//! Disassembler for 16-bit programs.
//!
//! Renders instruction words in the familiar `@value` / `dest=comp;jump`
//! notation.

use std::fmt;
use crate::cpu::decode::{decode, Dest, Instruction, Jump};
use crate::logic::{AluControl, Bit, Word16};

/// Named computations with the A register as the second operand.
const A_COMPS: [(u8, &str); 18] = [
    (0b101010, "0"),
    (0b111111, "1"),
    (0b111010, "-1"),
    (0b001100, "D"),
    (0b110000, "A"),
    (0b001101, "!D"),
    (0b110001, "!A"),
    (0b001111, "-D"),
    (0b110011, "-A"),
    (0b011111, "D+1"),
    (0b110111, "A+1"),
    (0b001110, "D-1"),
    (0b110010, "A-1"),
    (0b000010, "D+A"),
    (0b010011, "D-A"),
    (0b000111, "A-D"),
    (0b000000, "D&A"),
    (0b010101, "D|A"),
];

/// Named computations with the memory input as the second operand.
const M_COMPS: [(u8, &str); 10] = [
    (0b110000, "M"),
    (0b110001, "!M"),
    (0b110011, "-M"),
    (0b110111, "M+1"),
    (0b110010, "M-1"),
    (0b000010, "D+M"),
    (0b010011, "D-M"),
    (0b000111, "M-D"),
    (0b000000, "D&M"),
    (0b010101, "D|M"),
];

/// The mnemonic for a computation, if it has one.
pub fn comp_mnemonic(operand: Bit, control: AluControl) -> Option<&'static str> {
    let table: &[(u8, &str)] = match operand {
        Bit::O => &A_COMPS,
        Bit::I => &M_COMPS,
    };
    let pattern = control.to_u8();
    table.iter().find(|(p, _)| *p == pattern).map(|(_, name)| *name)
}

fn dest_mnemonic(dest: &Dest) -> String {
    let mut out = String::new();
    for (bit, name) in [(dest.a, 'A'), (dest.m, 'M'), (dest.d, 'D')] {
        if bit.is_high() {
            out.push(name);
        }
    }
    out
}

fn jump_mnemonic(jump: &Jump) -> Option<&'static str> {
    match (jump.lt, jump.eq, jump.gt) {
        (Bit::O, Bit::O, Bit::O) => None,
        (Bit::O, Bit::O, Bit::I) => Some("JGT"),
        (Bit::O, Bit::I, Bit::O) => Some("JEQ"),
        (Bit::O, Bit::I, Bit::I) => Some("JGE"),
        (Bit::I, Bit::O, Bit::O) => Some("JLT"),
        (Bit::I, Bit::O, Bit::I) => Some("JNE"),
        (Bit::I, Bit::I, Bit::O) => Some("JLE"),
        (Bit::I, Bit::I, Bit::I) => Some("JMP"),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Address(value) => write!(f, "@{}", value),
            Instruction::Compute { a, control, dest, jump } => {
                let dest = dest_mnemonic(dest);
                if !dest.is_empty() {
                    write!(f, "{}=", dest)?;
                }

                match comp_mnemonic(*a, *control) {
                    Some(name) => write!(f, "{}", name)?,
                    None => {
                        let prefix = if a.is_high() { "alu.m" } else { "alu" };
                        write!(f, "{}[{:06b}]", prefix, control.to_u8())?
                    }
                }

                if let Some(name) = jump_mnemonic(jump) {
                    write!(f, ";{}", name)?;
                }
                Ok(())
            }
        }
    }
}

/// Disassemble a single instruction word.
pub fn disassemble_word(word: &Word16) -> String {
    decode(word).to_string()
}

/// Disassemble a program into an address-annotated listing.
pub fn disassemble(program: &[Word16]) -> String {
    let mut output = String::new();

    for (addr, word) in program.iter().enumerate() {
        output.push_str(&format!("{:05}: {:<16}  // {}\n", addr, disassemble_word(word), word));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bits: &str) -> String {
        disassemble_word(&Word16::parse(bits).unwrap())
    }

    #[test]
    fn test_address_instruction() {
        assert_eq!(disassemble_word(&Word16::from_u16(21)), "@21");
        assert_eq!(disassemble_word(&Word16::from_u16(0x7fff)), "@32767");
    }

    #[test]
    fn test_compute_with_dest() {
        assert_eq!(text("1110110000010000"), "D=A");
        assert_eq!(text("1110001100001000"), "M=D");
        assert_eq!(text("1111110111011000"), "MD=M+1");
        assert_eq!(text("1110110111110000"), "AD=A+1");
    }

    #[test]
    fn test_compute_with_jump() {
        assert_eq!(text("1110101010000111"), "0;JMP");
        assert_eq!(text("1110001100000001"), "D;JGT");
        assert_eq!(text("1110010011010101"), "D=D-A;JNE");
    }

    #[test]
    fn test_unnamed_computation() {
        assert_eq!(text("1110100000000000"), "alu[100000]");
        assert_eq!(text("1111101010010000"), "D=alu.m[101010]");
    }

    #[test]
    fn test_every_named_comp_is_distinct() {
        for table in [&A_COMPS[..], &M_COMPS[..]] {
            for (i, (p, _)) in table.iter().enumerate() {
                assert!(table[i + 1..].iter().all(|(q, _)| q != p));
            }
        }
        assert_eq!(A_COMPS.len() + M_COMPS.len(), 28);
    }

    #[test]
    fn test_listing_format() {
        let listing = disassemble(&[Word16::from_u16(2), Word16::parse("1110110000010000").unwrap()]);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000: @2"));
        assert!(lines[1].starts_with("00001: D=A"));
        assert!(lines[1].ends_with("// 1110110000010000"));
    }
}
