use thiserror::Error;

use common::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("{len} words starting at {start:#06x} do not fit in memory")]
    Overflow { start: u16, len: usize },
    #[error("memory image has an odd number of bytes ({0})")]
    OddLength(usize),
}

/// Flat word-addressed memory behind the MAR.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    words: Vec<u16>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            words: vec![0; MEMORY_WORDS],
        }
    }

    pub fn read(&self, address: u16) -> u16 {
        self.words[address as usize]
    }

    pub fn write(&mut self, address: u16, value: u16) {
        self.words[address as usize] = value;
    }

    pub fn load(&mut self, start: u16, words: &[u16]) -> Result<(), MemoryError> {
        let start_index = start as usize;
        if start_index + words.len() > MEMORY_WORDS {
            return Err(MemoryError::Overflow {
                start,
                len: words.len(),
            });
        }
        self.words[start_index..start_index + words.len()].copy_from_slice(words);
        Ok(())
    }

    /// Parses little-endian 16-bit words.
    pub fn words_from_le_bytes(bytes: &[u8]) -> Result<Vec<u16>, MemoryError> {
        if bytes.len() % 2 != 0 {
            return Err(MemoryError::OddLength(bytes.len()));
        }
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.words.iter().filter(|w| **w != 0).count();
        write!(f, "Memory {{ words: {}, non-zero: {} }}", self.words.len(), used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write() {
        let mut mem = Memory::new();
        mem.write(0xFFFF, 0x1234);
        assert_eq!(0x1234, mem.read(0xFFFF));
        assert_eq!(0, mem.read(0));
        assert_eq!(MEMORY_WORDS, mem.words().len());
    }

    #[test]
    fn load() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[1, 2]).unwrap();
        assert_eq!(2, mem.read(0xFFFF));
        assert_eq!(
            Err(MemoryError::Overflow { start: 0xFFFF, len: 2 }),
            mem.load(0xFFFF, &[1, 2]));
    }

    #[test]
    fn le_words() {
        assert_eq!(vec![0x0500, 0xFC00], Memory::words_from_le_bytes(&[0x00, 0x05, 0x00, 0xFC]).unwrap());
        assert_eq!(Err(MemoryError::OddLength(3)), Memory::words_from_le_bytes(&[1, 2, 3]));
    }
}
