/*!
 * Allocation Paths
 * Find-fit search, placement with splitting, and the public operations
 */

use super::HeapManager;
use crate::core::limits::{CHUNK_SIZE, FIRST_BLOCK_OFFSET, MIN_BLOCK_SIZE, TAG_OVERHEAD};
use crate::core::types::{Address, Size};
use crate::heap::block::{align_up, BlockView};
use crate::heap::types::{HeapError, HeapResult};
use log::{debug, warn};

impl HeapManager {
    /// Allocate a block with at least `size` payload bytes
    ///
    /// Rounds the request up to an aligned block size, searches from the
    /// rover, and grows the heap when the search comes up empty. On
    /// success the rover lands on the block handed out.
    pub fn allocate(&mut self, size: Size) -> HeapResult<Address> {
        let asize = align_up(size + TAG_OVERHEAD);
        if asize < MIN_BLOCK_SIZE {
            warn!(
                "rejected allocation of {} bytes: below the minimum usable payload",
                size
            );
            return Err(HeapError::RequestTooSmall(size));
        }

        let block = match self.find_fit(asize) {
            Some(block) => block,
            None => {
                // Grow by at least one chunk so the fresh region is
                // guaranteed to hold the request
                let grown = self.grow(asize.max(CHUNK_SIZE))?;
                debug!(
                    "no fit for {} bytes, grew heap: free block of {} bytes at 0x{:x}",
                    asize,
                    grown.size(&self.segment),
                    grown.payload()
                );
                grown
            }
        };

        let placed = self.place(block, asize);
        self.rover = placed.payload();
        debug!(
            "allocated {} bytes at 0x{:x} (block size {})",
            size,
            placed.payload(),
            asize
        );
        Ok(placed.payload())
    }

    /// Free a payload previously returned by `allocate`
    ///
    /// Clears the allocated flag on both tags and merges with free
    /// neighbors immediately. Offsets that never came from `allocate` on
    /// this heap are outside the contract; no double-free detection is
    /// attempted.
    pub fn free(&mut self, payload: Address) {
        let block = BlockView::at(payload);
        block.set_allocated(&mut self.segment, false);
        let merged = self.coalesce(block);
        debug!(
            "freed 0x{:x}: free block of {} bytes at 0x{:x}",
            payload,
            merged.size(&self.segment),
            merged.payload()
        );
    }

    /// Move an allocation to a block with at least `new_size` payload bytes
    ///
    /// Allocate-new, copy, free-old. When the new allocation cannot be
    /// satisfied the original block stays live and intact and the error is
    /// returned to the caller.
    pub fn reallocate(&mut self, payload: Address, new_size: Size) -> HeapResult<Address> {
        let new_payload = self.allocate(new_size)?;
        let old = BlockView::at(payload);
        let copy = old.payload_capacity(&self.segment).min(new_size);
        self.segment.copy_within(payload, new_payload, copy);
        self.free(payload);
        debug!(
            "reallocated 0x{:x} -> 0x{:x} ({} bytes carried over)",
            payload, new_payload, copy
        );
        Ok(new_payload)
    }

    /// First free block of at least `asize` bytes, rover first
    ///
    /// Scans `[rover, epilogue)` and wraps to `[first block, rover)`. The
    /// first sufficiently large free block wins regardless of fit quality.
    fn find_fit(&self, asize: Size) -> Option<BlockView> {
        self.scan(self.rover, None, asize)
            .or_else(|| self.scan(FIRST_BLOCK_OFFSET, Some(self.rover), asize))
    }

    fn scan(&self, from: Address, until: Option<Address>, asize: Size) -> Option<BlockView> {
        let mut at = from;
        loop {
            if let Some(stop) = until {
                if at >= stop {
                    return None;
                }
            }
            let block = BlockView::at(at);
            let size = block.size(&self.segment);
            if size == 0 {
                // epilogue
                return None;
            }
            if !block.is_allocated(&self.segment) && size >= asize {
                return Some(block);
            }
            at += size;
        }
    }

    /// Commit `asize` bytes of a free block, splitting off the remainder
    ///
    /// The remainder becomes a free block of its own only when it clears
    /// the minimum block size; otherwise the whole block is handed out and
    /// the padding stays inside. A split remainder is coalesced at once to
    /// keep the no-adjacent-free invariant when the successor has just been
    /// vacated.
    fn place(&mut self, block: BlockView, asize: Size) -> BlockView {
        let csize = block.size(&self.segment);
        if csize - asize >= MIN_BLOCK_SIZE {
            block.write_tags(&mut self.segment, asize, true);
            let remainder = BlockView::at(block.payload() + asize);
            remainder.write_tags(&mut self.segment, csize - asize, false);
            self.coalesce(remainder);
        } else {
            block.write_tags(&mut self.segment, csize, true);
        }
        block
    }
}
