use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use common::*;

use crate::IDLE_WORD;

pub const HEADER_MAGIC: [u8; 8] = *b"UCODEHDR";
pub const FOOTER_MAGIC: [u8; 8] = *b"UCODEEND";

pub const BODY_BYTES: usize = CONTROL_STORE_WORDS * CONTROL_WORD_BYTES;
pub const IMAGE_BYTES: usize = HEADER_MAGIC.len() + BODY_BYTES + FOOTER_MAGIC.len();

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FormatError {
    #[error("image does not start with the control store header")]
    BadHeader,
    #[error("image does not end with the control store footer")]
    BadFooter,
    #[error("image body is {found} bytes, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("could not access control store image: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed control store image: {0}")]
    Format(#[from] FormatError),
}

/// The microcode ROM. Immutable once built or loaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ControlStore {
    words: Vec<u64>,
}

impl ControlStore {
    /// A store where every word is idle.
    pub fn idle() -> ControlStore {
        ControlStore {
            words: vec![IDLE_WORD; CONTROL_STORE_WORDS],
        }
    }

    pub(crate) fn from_words(words: Vec<u64>) -> ControlStore {
        assert_eq!(CONTROL_STORE_WORDS, words.len());
        ControlStore { words }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ControlStore, FormatError> {
        if bytes.get(..HEADER_MAGIC.len()) != Some(&HEADER_MAGIC[..]) {
            return Err(FormatError::BadHeader);
        }

        let framing = HEADER_MAGIC.len() + FOOTER_MAGIC.len();
        if bytes.len() < framing || bytes[bytes.len() - FOOTER_MAGIC.len()..] != FOOTER_MAGIC {
            return Err(FormatError::BadFooter);
        }

        let body = &bytes[HEADER_MAGIC.len()..bytes.len() - FOOTER_MAGIC.len()];
        if body.len() != BODY_BYTES {
            return Err(FormatError::SizeMismatch {
                expected: BODY_BYTES,
                found: body.len(),
            });
        }

        let words = body
            .chunks_exact(CONTROL_WORD_BYTES)
            .map(|chunk| {
                let mut le = [0u8; 8];
                le[..CONTROL_WORD_BYTES].copy_from_slice(chunk);
                u64::from_le_bytes(le)
            })
            .collect();

        Ok(ControlStore { words })
    }

    pub fn read<R: Read>(mut r: R) -> Result<ControlStore, ImageError> {
        let mut bytes = Vec::with_capacity(IMAGE_BYTES);
        r.read_to_end(&mut bytes)?;
        Ok(ControlStore::from_bytes(&bytes)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<ControlStore, ImageError> {
        let store = ControlStore::read(File::open(path.as_ref())?)?;
        log::info!("loaded control store image {}", path.as_ref().display());
        Ok(store)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(IMAGE_BYTES);
        bytes.extend_from_slice(&HEADER_MAGIC);
        for word in &self.words {
            bytes.extend_from_slice(&word.to_le_bytes()[..CONTROL_WORD_BYTES]);
        }
        bytes.extend_from_slice(&FOOTER_MAGIC);
        bytes
    }

    pub fn write<W: Write>(&self, mut w: W) -> Result<(), ImageError> {
        w.write_all(&self.to_bytes())?;
        w.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageError> {
        self.write(File::create(path)?)
    }

    /// Raw 40-bit word at a 13-bit micro-address.
    pub fn word(&self, address: u16) -> u64 {
        self.words[address as usize & (CONTROL_STORE_WORDS - 1)]
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl std::fmt::Debug for ControlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let authored = self.words.iter().filter(|w| **w != IDLE_WORD).count();
        write!(f, "ControlStore {{ words: {}, non-idle: {} }}", self.words.len(), authored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image_of(words: &[u64]) -> Vec<u8> {
        let mut bytes = HEADER_MAGIC.to_vec();
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes()[..5]);
        }
        bytes.extend_from_slice(&FOOTER_MAGIC);
        bytes
    }

    fn patterned() -> Vec<u64> {
        (0..CONTROL_STORE_WORDS as u64)
            .map(|i| (i * 0x0123_4567_89) & CONTROL_WORD_MASK)
            .collect()
    }

    #[test]
    fn load() {
        let words = patterned();
        let store = ControlStore::from_bytes(&image_of(&words)).unwrap();
        assert_eq!(&words[..], store.words());
        assert_eq!(words[0x1FFF], store.word(0x1FFF));
        assert_eq!(IMAGE_BYTES, store.to_bytes().len());
        assert_eq!(image_of(&words), store.to_bytes());
    }

    #[test]
    fn little_endian_packing() {
        let mut words = vec![0u64; CONTROL_STORE_WORDS];
        words[1] = 0x12_3456_789A;
        let bytes = image_of(&words);
        assert_eq!(&[0x9A, 0x78, 0x56, 0x34, 0x12], &bytes[8 + 5..8 + 10]);
        assert_eq!(0x12_3456_789A, ControlStore::from_bytes(&bytes).unwrap().word(1));
    }

    #[test]
    fn truncated_body() {
        let mut bytes = image_of(&patterned());
        bytes.remove(8);
        assert_eq!(
            Err(FormatError::SizeMismatch { expected: BODY_BYTES, found: BODY_BYTES - 1 }),
            ControlStore::from_bytes(&bytes));
    }

    #[test]
    fn trailing_body_bytes() {
        let mut bytes = image_of(&patterned());
        bytes.insert(8, 0);
        assert_eq!(
            Err(FormatError::SizeMismatch { expected: BODY_BYTES, found: BODY_BYTES + 1 }),
            ControlStore::from_bytes(&bytes));
    }

    #[test]
    fn header_checked_first() {
        let mut bytes = image_of(&patterned());
        bytes[3] ^= 0xFF;
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(Err(FormatError::BadHeader), ControlStore::from_bytes(&bytes));
    }

    #[test]
    fn bad_footer() {
        let mut bytes = image_of(&patterned());
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert_eq!(Err(FormatError::BadFooter), ControlStore::from_bytes(&bytes));
    }

    #[test]
    fn short_inputs() {
        assert_eq!(Err(FormatError::BadHeader), ControlStore::from_bytes(&[]));
        assert_eq!(Err(FormatError::BadHeader), ControlStore::from_bytes(b"UCODE"));
        assert_eq!(Err(FormatError::BadFooter), ControlStore::from_bytes(&HEADER_MAGIC));
        let mut framing = HEADER_MAGIC.to_vec();
        framing.extend_from_slice(&FOOTER_MAGIC);
        assert_eq!(
            Err(FormatError::SizeMismatch { expected: BODY_BYTES, found: 0 }),
            ControlStore::from_bytes(&framing));
    }

    #[test]
    fn read_write() {
        let store = ControlStore::from_bytes(&image_of(&patterned())).unwrap();
        let mut out = Vec::new();
        store.write(&mut out).unwrap();
        let reread = ControlStore::read(&out[..]).unwrap();
        assert!(store == reread);
    }

    #[test]
    fn read_reports_format() {
        match ControlStore::read(&b"not an image"[..]) {
            Err(ImageError::Format(FormatError::BadHeader)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn any_header_corruption(index in 0usize..8, flip in 1u8..=255) {
            let mut bytes = image_of(&vec![IDLE_WORD; CONTROL_STORE_WORDS]);
            bytes[index] ^= flip;
            prop_assert_eq!(Err(FormatError::BadHeader), ControlStore::from_bytes(&bytes));
        }

        #[test]
        fn words_survive(word in 0u64..(1 << 40), address in 0usize..CONTROL_STORE_WORDS) {
            let mut words = vec![IDLE_WORD; CONTROL_STORE_WORDS];
            words[address] = word;
            let store = ControlStore::from_bytes(&image_of(&words)).unwrap();
            prop_assert_eq!(word, store.word(address as u16));
        }
    }
}
