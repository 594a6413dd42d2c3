use rand::Rng;

use common::*;

/// A fixed set of independent 16-bit registers addressed by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bank<const N: usize> {
    cells: [u16; N],
}

pub type RegisterFile = Bank<REGISTER_COUNT>;
pub type SegmentFile = Bank<SEGMENT_COUNT>;

impl<const N: usize> Bank<N> {
    pub fn new() -> Self {
        Bank { cells: [0; N] }
    }

    pub fn read(&self, index: usize) -> u16 {
        self.cells[index % N]
    }

    pub fn write(&mut self, index: usize, value: u16) {
        self.cells[index % N] = value;
    }

    pub fn cells(&self) -> &[u16; N] {
        &self.cells
    }

    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for cell in self.cells.iter_mut() {
            *cell = rng.gen();
        }
    }
}

impl<const N: usize> Default for Bank<N> {
    fn default() -> Self {
        Bank::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn no_aliasing() {
        let mut regs = RegisterFile::new();
        for i in 0..REGISTER_COUNT {
            regs.write(i, 0x1000 + i as u16);
        }
        for i in 0..REGISTER_COUNT {
            assert_eq!(0x1000 + i as u16, regs.read(i));
        }
    }

    #[test]
    fn segments() {
        let mut segs = SegmentFile::new();
        segs.write(3, 0xBEEF);
        assert_eq!(&[0, 0, 0, 0xBEEF], segs.cells());
    }

    #[test]
    fn randomize_is_seeded() {
        let mut a = RegisterFile::new();
        let mut b = RegisterFile::new();
        a.randomize(&mut StdRng::seed_from_u64(7));
        b.randomize(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_ne!(RegisterFile::new(), a);
    }
}
