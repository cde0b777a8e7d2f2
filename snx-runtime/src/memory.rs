//! Word-addressed data memory

use snx_spec::Word;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    written: Vec<bool>,
}

impl Memory {
    /// `size` zeroed words
    pub fn new(size: u32) -> Self {
        Memory {
            cells: vec![0; size as usize],
            written: vec![false; size as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.cells.len() as u32
    }

    #[inline]
    pub fn contains(&self, address: Word) -> bool {
        (address as usize) < self.cells.len()
    }

    /// Read a cell, `None` when `address` is outside memory
    pub fn load(&self, address: Word) -> Option<Word> {
        self.cells.get(address as usize).copied()
    }

    /// Write a cell; returns false (and changes nothing) when out of range
    pub fn store(&mut self, address: Word, value: Word) -> bool {
        match self.cells.get_mut(address as usize) {
            Some(cell) => {
                *cell = value;
                self.written[address as usize] = true;
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    pub fn was_written(&self, address: Word) -> bool {
        self.written.get(address as usize).copied().unwrap_or(false)
    }
}
