/*!
 * Boundary Tags
 * Block view over the implicit free-list encoding
 */

use super::segment::HeapSegment;
use crate::core::limits::{ALIGNMENT, PROLOGUE_OFFSET, TAG_OVERHEAD, WORD_SIZE};
use crate::core::types::{Address, Size, Word};

// Sizes are multiples of 8, so the low three tag bits are repurposed:
// bit 0 is the allocated flag, bits 1-2 stay clear.
const SIZE_MASK: Word = !0x7;
const ALLOC_BIT: Word = 0x1;

/// Pack a block size and allocated flag into one tag word
pub(crate) fn pack(size: Size, allocated: bool) -> Word {
    debug_assert!(size % ALIGNMENT == 0);
    debug_assert!(size <= Word::MAX as Size);
    (size as Word & SIZE_MASK) | (allocated as Word)
}

/// Size field of a tag word
pub(crate) fn tag_size(tag: Word) -> Size {
    (tag & SIZE_MASK) as Size
}

/// Allocated flag of a tag word
pub(crate) fn tag_allocated(tag: Word) -> bool {
    tag & ALLOC_BIT != 0
}

/// Round `size` up to the alignment unit
pub(crate) fn align_up(size: Size) -> Size {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// View of one block, addressed by its payload offset
///
/// Carries no state of its own: size and status live in the boundary tags,
/// so a view is an offset plus accessors. The free "list" is derived from
/// the tags and never materialized as a linked structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockView {
    payload: Address,
}

impl BlockView {
    /// View of the block whose payload starts at `payload`
    pub fn at(payload: Address) -> Self {
        Self { payload }
    }

    /// Payload offset
    pub fn payload(&self) -> Address {
        self.payload
    }

    /// Header tag offset
    pub fn header(&self) -> Address {
        self.payload - WORD_SIZE
    }

    /// Footer tag offset
    pub fn footer(&self, seg: &HeapSegment) -> Address {
        self.payload + self.size(seg) - TAG_OVERHEAD
    }

    /// Block size, tags included
    pub fn size(&self, seg: &HeapSegment) -> Size {
        tag_size(seg.word(self.header()))
    }

    /// Usable payload bytes
    pub fn payload_capacity(&self, seg: &HeapSegment) -> Size {
        self.size(seg) - TAG_OVERHEAD
    }

    /// Allocated flag from the header tag
    pub fn is_allocated(&self, seg: &HeapSegment) -> bool {
        tag_allocated(seg.word(self.header()))
    }

    /// Write header and footer together for a block of `size` bytes
    ///
    /// The pair is always written as a unit; a header that disagrees with
    /// its footer breaks backward traversal.
    pub fn write_tags(&self, seg: &mut HeapSegment, size: Size, allocated: bool) {
        let tag = pack(size, allocated);
        seg.set_word(self.header(), tag);
        seg.set_word(self.payload + size - TAG_OVERHEAD, tag);
    }

    /// Flip the allocated flag on both tags, keeping the size
    pub fn set_allocated(&self, seg: &mut HeapSegment, allocated: bool) {
        self.write_tags(seg, self.size(seg), allocated);
    }

    /// Next block in address order, or `None` past the heap end
    ///
    /// The epilogue is never returned: callers treat a `None` neighbor as
    /// an allocated boundary.
    pub fn next(&self, seg: &HeapSegment) -> Option<BlockView> {
        let next = self.payload + self.size(seg);
        if next >= seg.size() {
            return None;
        }
        Some(BlockView::at(next))
    }

    /// Previous block in address order, or `None` before the heap start
    ///
    /// Reads the predecessor's footer, which sits one word before this
    /// block's header.
    pub fn prev(&self, seg: &HeapSegment) -> Option<BlockView> {
        let prev_size = tag_size(seg.word(self.payload - TAG_OVERHEAD));
        if prev_size == 0 || self.payload < prev_size + PROLOGUE_OFFSET {
            return None;
        }
        Some(BlockView::at(self.payload - prev_size))
    }
}
