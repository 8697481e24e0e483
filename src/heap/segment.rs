/*!
 * Heap Segment
 * Simulated flat heap grown through an sbrk-style primitive
 */

use super::types::{HeapError, HeapResult};
use crate::core::limits::WORD_SIZE;
use crate::core::types::{Address, Size, Word};
use log::{debug, warn};

/// Growable byte arena standing in for the process heap
///
/// The segment is the single owner of the heap bytes. It only ever grows,
/// one `sbrk` call at a time, up to a hard limit fixed at construction.
/// Offsets are plain indexes into the arena; the word and byte accessors
/// expect in-range offsets and panic otherwise, so callers outside the
/// allocator go through the bounds-checked payload API instead.
#[derive(Debug)]
pub struct HeapSegment {
    bytes: Vec<u8>,
    limit: Size,
}

impl HeapSegment {
    /// Empty segment with a hard growth limit
    pub fn with_limit(limit: Size) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Extend the segment by `incr` bytes and return the old top offset
    ///
    /// `incr` must be a positive multiple of the word size. A refusal
    /// leaves the segment untouched.
    pub fn sbrk(&mut self, incr: Size) -> HeapResult<Address> {
        debug_assert!(incr > 0 && incr % WORD_SIZE == 0);
        let old_top = self.bytes.len();
        if old_top + incr > self.limit {
            warn!(
                "sbrk refused: requested {} bytes at top 0x{:x}, {} bytes left of {} byte limit",
                incr,
                old_top,
                self.limit - old_top,
                self.limit
            );
            return Err(HeapError::Exhausted {
                requested: incr,
                available: self.limit - old_top,
                limit: self.limit,
            });
        }
        self.bytes.resize(old_top + incr, 0);
        debug!(
            "sbrk: grew segment by {} bytes, top now 0x{:x}",
            incr,
            self.bytes.len()
        );
        Ok(old_top)
    }

    /// Current break, i.e. the total segment size in bytes
    pub fn size(&self) -> Size {
        self.bytes.len()
    }

    /// Hard growth limit in bytes
    pub fn limit(&self) -> Size {
        self.limit
    }

    /// Read the boundary tag word at `at`
    pub fn word(&self, at: Address) -> Word {
        let mut raw = [0u8; WORD_SIZE];
        raw.copy_from_slice(&self.bytes[at..at + WORD_SIZE]);
        Word::from_ne_bytes(raw)
    }

    /// Write the boundary tag word at `at`
    pub fn set_word(&mut self, at: Address, value: Word) {
        self.bytes[at..at + WORD_SIZE].copy_from_slice(&value.to_ne_bytes());
    }

    /// Borrow `len` heap bytes starting at `at`
    pub fn bytes(&self, at: Address, len: Size) -> &[u8] {
        &self.bytes[at..at + len]
    }

    /// Mutably borrow `len` heap bytes starting at `at`
    pub fn bytes_mut(&mut self, at: Address, len: Size) -> &mut [u8] {
        &mut self.bytes[at..at + len]
    }

    /// Copy `len` bytes from `src` to `dst` within the segment
    pub fn copy_within(&mut self, src: Address, dst: Address, len: Size) {
        self.bytes.copy_within(src..src + len, dst);
    }
}
