//! Byte-addressable, word-aligned execution memory.
//!
//! The buffer can be shared down a frame chain through a checkpoint: a child
//! frame's memory starts at the parent's high-water mark and everything the
//! child grew is truncated away on teardown. All offsets below are relative
//! to the active checkpoint.
//!
//! Expansion is paid with the quadratic schedule
//! `3 * words + words^2 / 512`, charged as the difference between the cost
//! of the new and the current size. The last computed (size, words, cost)
//! triple is memoized so repeated queries at or below the current size cost
//! nothing.

use crate::{
    constants::{WORD_SIZE, gas_cost},
    errors::VMError,
};
use ethereum_types::U256;

#[derive(Debug, Clone)]
pub struct Memory {
    buffer: Vec<u8>,
    checkpoint: usize,
    limit: usize,
    // Memoized cost of the current size.
    cached_size: usize,
    cached_words: u64,
    cached_cost: u64,
}

fn word_count(size: usize) -> u64 {
    (size as u64).div_ceil(WORD_SIZE as u64)
}

fn size_cost(words: u64) -> u64 {
    gas_cost::MEMORY_WORD
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / gas_cost::MEMORY_QUADRATIC_DENOMINATOR)
}

impl Memory {
    pub fn new(initial_capacity: usize, limit: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(initial_capacity),
            checkpoint: 0,
            limit,
            cached_size: 0,
            cached_words: 0,
            cached_cost: 0,
        }
    }

    /// Active memory size in bytes; always a multiple of the word size.
    pub fn size(&self) -> usize {
        self.buffer.len() - self.checkpoint
    }

    /// Forget all data above the checkpoint and reset the cost cache.
    pub fn clear(&mut self) {
        self.buffer.truncate(self.checkpoint);
        self.cached_size = 0;
        self.cached_words = 0;
        self.cached_cost = 0;
    }

    /// Open a child region at the current high-water mark. Returns the
    /// previous checkpoint, to be passed back to [`Memory::exit_checkpoint`].
    pub fn enter_checkpoint(&mut self) -> usize {
        let previous = self.checkpoint;
        self.checkpoint = self.buffer.len();
        self.cached_size = 0;
        self.cached_words = 0;
        self.cached_cost = 0;
        previous
    }

    /// Drop the child region and restore the parent's view.
    pub fn exit_checkpoint(&mut self, previous: usize) {
        self.buffer.truncate(self.checkpoint);
        self.checkpoint = previous;
        self.cached_size = 0;
        self.cached_words = 0;
        self.cached_cost = 0;
    }

    /// Gas needed to grow the active region so that `offset + len` bytes are
    /// addressable, zero if it already is. Does not grow anything.
    pub fn expansion_cost(&mut self, offset: usize, len: usize) -> Result<u64, VMError> {
        if len == 0 {
            return Ok(0);
        }
        let end = offset.checked_add(len).ok_or(VMError::OutOfBounds)?;
        let new_size = end
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or(VMError::OutOfBounds)?;
        if new_size <= self.size() {
            return Ok(0);
        }
        if new_size > self.limit {
            return Err(VMError::MemoryLimitReached);
        }

        let current_words = if self.cached_size == self.size() {
            self.cached_words
        } else {
            word_count(self.size())
        };
        let current_cost = if self.cached_size == self.size() {
            self.cached_cost
        } else {
            size_cost(current_words)
        };

        let new_words = word_count(new_size);
        let new_cost = size_cost(new_words);
        self.cached_size = new_size;
        self.cached_words = new_words;
        self.cached_cost = new_cost;

        Ok(new_cost.saturating_sub(current_cost))
    }

    /// Grow (zero-filled, word-aligned) so `offset + len` is addressable.
    fn resize_for(&mut self, offset: usize, len: usize) -> Result<(), VMError> {
        if len == 0 {
            return Ok(());
        }
        let end = offset.checked_add(len).ok_or(VMError::OutOfBounds)?;
        let new_size = end
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or(VMError::OutOfBounds)?;
        if new_size > self.limit {
            return Err(VMError::MemoryLimitReached);
        }
        if new_size > self.size() {
            self.buffer.resize(self.checkpoint + new_size, 0);
        }
        Ok(())
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VMError> {
        self.resize_for(offset, WORD_SIZE)?;
        let start = self.checkpoint + offset;
        Ok(U256::from_big_endian(&self.buffer[start..start + WORD_SIZE]))
    }

    pub fn store_word(&mut self, offset: usize, value: U256) -> Result<(), VMError> {
        self.resize_for(offset, WORD_SIZE)?;
        let start = self.checkpoint + offset;
        self.buffer[start..start + WORD_SIZE].copy_from_slice(&value.to_big_endian());
        Ok(())
    }

    pub fn store_byte(&mut self, offset: usize, value: u8) -> Result<(), VMError> {
        self.resize_for(offset, 1)?;
        self.buffer[self.checkpoint + offset] = value;
        Ok(())
    }

    pub fn load_range(&mut self, offset: usize, len: usize) -> Result<Vec<u8>, VMError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.resize_for(offset, len)?;
        let start = self.checkpoint + offset;
        Ok(self.buffer[start..start + len].to_vec())
    }

    pub fn store_range(&mut self, offset: usize, data: &[u8]) -> Result<(), VMError> {
        if data.is_empty() {
            return Ok(());
        }
        self.resize_for(offset, data.len())?;
        let start = self.checkpoint + offset;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// MCOPY semantics: overlapping ranges behave like memmove.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) -> Result<(), VMError> {
        if len == 0 {
            return Ok(());
        }
        self.resize_for(src.max(dst), len)?;
        let src = self.checkpoint + src;
        let dst = self.checkpoint + dst;
        self.buffer.copy_within(src..src + len, dst);
        Ok(())
    }

    /// Read-only view for observation; zero-filled past the active size is
    /// not provided, out-of-range is an error.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], VMError> {
        let end = offset.checked_add(len).ok_or(VMError::OutOfBounds)?;
        if end > self.size() {
            return Err(VMError::OutOfBounds);
        }
        let start = self.checkpoint + offset;
        Ok(&self.buffer[start..start + len])
    }
}
