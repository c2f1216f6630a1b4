//! `.hack` program files.
//!
//! The format is plain text:
//! - One instruction per line
//! - Exactly 16 `0`/`1` characters, most significant bit first
//! - Surrounding whitespace and blank lines are ignored

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;
use crate::logic::{BusError, Word16};

/// Parse the text of a `.hack` file.
pub fn parse_hack(text: &str) -> Result<Vec<Word16>, HackError> {
    let mut program = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        if let Some(word) = parse_line(line, line_num + 1)? {
            program.push(word);
        }
    }
    Ok(program)
}

/// Load a `.hack` file from disk.
pub fn load_hack<P: AsRef<Path>>(path: P) -> Result<Vec<Word16>, HackError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| HackError::Io(e.to_string()))?;
    let reader = BufReader::new(file);

    let mut program = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| HackError::Io(e.to_string()))?;
        if let Some(word) = parse_line(&line, line_num + 1)? {
            program.push(word);
        }
    }
    Ok(program)
}

/// Save a program to disk, one word per line.
pub fn save_hack<P: AsRef<Path>>(path: P, program: &[Word16]) -> Result<(), HackError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| HackError::Io(e.to_string()))?;

    for word in program {
        writeln!(file, "{}", word).map_err(|e| HackError::Io(e.to_string()))?;
    }

    Ok(())
}

fn parse_line(line: &str, line_num: usize) -> Result<Option<Word16>, HackError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Word16::parse(trimmed)
        .map(Some)
        .map_err(|source| HackError::Parse { line: line_num, source })
}

/// Errors that can occur while reading or writing `.hack` files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HackError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error on line {line}: {source}")]
    Parse { line: usize, source: BusError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program() {
        let text = "0000000000000010\n  1110110000010000  \n\n0000000000000011\n";
        let program = parse_hack(text).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program[0].to_u16(), 2);
        assert_eq!(program[1].to_u16(), 0xec10);
        assert_eq!(program[2].to_u16(), 3);
    }

    #[test]
    fn test_parse_reports_line_of_short_word() {
        let text = "0000000000000010\n\n101\n";
        assert_eq!(
            parse_hack(text),
            Err(HackError::Parse {
                line: 3,
                source: BusError::InvalidWidth { expected: 16, got: 3 },
            })
        );
    }

    #[test]
    fn test_parse_rejects_non_binary() {
        let text = "000000000000001x";
        assert_eq!(
            parse_hack(text),
            Err(HackError::Parse { line: 1, source: BusError::InvalidBit('x') })
        );
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("nand16-{}.hack", std::process::id()));
        let program = vec![Word16::from_u16(21), Word16::from_u16(0xfc10)];

        save_hack(&path, &program).unwrap();
        let loaded = load_hack(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, program);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_hack("/nonexistent/nand16/program.hack");
        assert!(matches!(result, Err(HackError::Io(_))));
    }
}
