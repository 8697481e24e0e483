/*!
 * Heap Manager
 *
 * Owner of the simulated heap: bootstrap sentinels, on-demand growth, and
 * the block-chain traversal every other concern is built on.
 *
 * ## Layout
 *
 * ```text
 * | pad | prologue hdr | prologue ftr | zero or more blocks | epilogue hdr |
 * |  4  |   8:alloc    |   8:alloc    |                     |   0:alloc    |
 * ```
 *
 * The permanently allocated prologue and epilogue sentinels bound the
 * usable region, so neighbor traversal never reads outside the heap and
 * coalescing needs no edge-case branches.
 */

mod allocator;
mod checker;
mod coalesce;
mod storage;

use super::block::{align_up, pack, BlockView};
use super::segment::HeapSegment;
use super::traits::{Allocator, HeapInspect};
use super::types::{BlockInfo, HeapError, HeapResult, HeapStats, Violation};
use crate::core::limits::{
    ALIGNMENT, CHUNK_SIZE, DEFAULT_HEAP_LIMIT, FIRST_BLOCK_OFFSET, WORD_SIZE,
};
use crate::core::types::{Address, Size};
use log::{debug, info};

/// Implicit-free-list heap over one owned segment
///
/// A manager instance is the sole owner of its segment and search cursor;
/// every operation takes `&mut self`, and independent heaps are independent
/// values with no shared state.
#[derive(Debug)]
pub struct HeapManager {
    pub(super) segment: HeapSegment,
    /// Next-fit search cursor: payload offset of the last block handed out
    pub(super) rover: Address,
}

impl HeapManager {
    /// Bootstrap a heap with the default segment limit
    pub fn new() -> HeapResult<Self> {
        Self::with_limit(DEFAULT_HEAP_LIMIT)
    }

    /// Bootstrap a heap capped at `limit` bytes
    ///
    /// Lays down the alignment pad and the prologue/epilogue sentinels,
    /// then grows by one chunk so the first allocation has free space to
    /// search. Either refusal is a fatal bootstrap error and no heap value
    /// is produced.
    pub fn with_limit(limit: Size) -> HeapResult<Self> {
        let mut segment = HeapSegment::with_limit(limit);
        let bootstrap = 4 * WORD_SIZE;
        segment.sbrk(bootstrap).map_err(|_| HeapError::InitFailed {
            requested: bootstrap,
        })?;

        // pad word, prologue header/footer, epilogue header
        segment.set_word(0, 0);
        segment.set_word(WORD_SIZE, pack(ALIGNMENT, true));
        segment.set_word(2 * WORD_SIZE, pack(ALIGNMENT, true));
        segment.set_word(3 * WORD_SIZE, pack(0, true));

        let mut heap = Self {
            segment,
            rover: FIRST_BLOCK_OFFSET,
        };
        heap.grow(CHUNK_SIZE).map_err(|_| HeapError::InitFailed {
            requested: CHUNK_SIZE,
        })?;

        info!(
            "heap bootstrapped: {} byte initial region, {} byte segment limit",
            CHUNK_SIZE, limit
        );
        Ok(heap)
    }

    /// Extend the heap and hand back the resulting free block
    ///
    /// Rounds `bytes` up to the alignment unit and formats the grown region
    /// as one free block whose header recycles the old epilogue slot; a
    /// fresh size-0 epilogue is written at the new end. The new block is
    /// coalesced before being returned, since a free block may have been
    /// sitting at the old heap end. A refusal by the growth primitive
    /// propagates as exhaustion with the segment untouched.
    pub(super) fn grow(&mut self, bytes: Size) -> HeapResult<BlockView> {
        let size = align_up(bytes);
        let old_top = self.segment.sbrk(size)?;

        let block = BlockView::at(old_top);
        block.write_tags(&mut self.segment, size, false);
        self.segment
            .set_word(old_top + size - WORD_SIZE, pack(0, true));

        debug!(
            "heap grown by {} bytes: free block at 0x{:x}, epilogue at 0x{:x}",
            size,
            old_top,
            self.segment.size() - WORD_SIZE
        );
        Ok(self.coalesce(block))
    }

    /// Total heap bytes, sentinels included
    pub fn heap_size(&self) -> Size {
        self.segment.size()
    }

    /// Iterate real blocks in address order, stopping at the epilogue
    pub(super) fn block_chain(&self) -> BlockChain<'_> {
        BlockChain {
            segment: &self.segment,
            at: FIRST_BLOCK_OFFSET,
        }
    }

    /// Snapshot every block between the sentinels
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.block_chain()
            .map(|block| BlockInfo {
                payload: block.payload(),
                size: block.size(&self.segment),
                allocated: block.is_allocated(&self.segment),
            })
            .collect()
    }

    /// Statistics computed from the block chain
    ///
    /// The free list is a derived view over the tags, so the numbers are
    /// recomputed per call instead of tracked by counters that could drift
    /// from the encoding.
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            heap_bytes: self.segment.size(),
            allocated_bytes: 0,
            free_bytes: 0,
            allocated_blocks: 0,
            free_blocks: 0,
            largest_free_block: 0,
        };
        for block in self.block_chain() {
            let size = block.size(&self.segment);
            if block.is_allocated(&self.segment) {
                stats.allocated_blocks += 1;
                stats.allocated_bytes += size;
            } else {
                stats.free_blocks += 1;
                stats.free_bytes += size;
                stats.largest_free_block = stats.largest_free_block.max(size);
            }
        }
        stats
    }
}

/// Address-ordered block iterator; ends on the size-0 epilogue header
pub(super) struct BlockChain<'a> {
    segment: &'a HeapSegment,
    at: Address,
}

impl Iterator for BlockChain<'_> {
    type Item = BlockView;

    fn next(&mut self) -> Option<BlockView> {
        let block = BlockView::at(self.at);
        let size = block.size(self.segment);
        if size == 0 {
            return None;
        }
        self.at += size;
        Some(block)
    }
}

// Implement trait interfaces
impl Allocator for HeapManager {
    fn allocate(&mut self, size: Size) -> HeapResult<Address> {
        HeapManager::allocate(self, size)
    }

    fn free(&mut self, payload: Address) {
        HeapManager::free(self, payload)
    }

    fn reallocate(&mut self, payload: Address, new_size: Size) -> HeapResult<Address> {
        HeapManager::reallocate(self, payload, new_size)
    }
}

impl HeapInspect for HeapManager {
    fn stats(&self) -> HeapStats {
        HeapManager::stats(self)
    }

    fn blocks(&self) -> Vec<BlockInfo> {
        HeapManager::blocks(self)
    }

    fn check(&self, verbose: bool) -> Vec<Violation> {
        HeapManager::check(self, verbose)
    }
}
