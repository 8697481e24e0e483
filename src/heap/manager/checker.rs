/*!
 * Consistency Checker
 * Read-only structural audit of the block chain
 */

use super::HeapManager;
use crate::core::limits::{ALIGNMENT, MIN_BLOCK_SIZE, PROLOGUE_OFFSET, WORD_SIZE};
use crate::core::types::Address;
use crate::heap::block::{tag_allocated, tag_size, BlockView};
use crate::heap::types::Violation;
use log::{debug, warn};

impl HeapManager {
    /// Walk the heap and report every violation found
    ///
    /// Diagnostic only: nothing is repaired and the walk never halts early.
    /// Meant to run between operations from a test harness, not on the
    /// allocation path. With `verbose` set, every block is dumped at debug
    /// level.
    pub fn check(&self, verbose: bool) -> Vec<Violation> {
        let mut violations = Vec::new();

        if verbose {
            debug!("heap ({} bytes):", self.segment.size());
        }

        // prologue: fixed size, permanently allocated, tags in sync
        let prologue = BlockView::at(PROLOGUE_OFFSET);
        if prologue.size(&self.segment) != ALIGNMENT
            || !prologue.is_allocated(&self.segment)
            || self.segment.word(prologue.header()) != self.segment.word(prologue.footer(&self.segment))
        {
            violations.push(Violation::BadPrologue);
        }

        let mut last_free: Option<Address> = None;
        for block in self.block_chain() {
            if verbose {
                self.dump_block(block);
            }
            self.check_block(block, &mut violations);

            let free = !block.is_allocated(&self.segment);
            if let (Some(first), true) = (last_free, free) {
                violations.push(Violation::AdjacentFree {
                    first,
                    second: block.payload(),
                });
            }
            last_free = free.then(|| block.payload());
        }

        // epilogue: size zero, allocated
        let epilogue = self.segment.word(self.segment.size() - WORD_SIZE);
        if tag_size(epilogue) != 0 || !tag_allocated(epilogue) {
            violations.push(Violation::BadEpilogue);
        }

        for violation in &violations {
            warn!("heap check: {}", violation);
        }
        violations
    }

    fn check_block(&self, block: BlockView, violations: &mut Vec<Violation>) {
        let payload = block.payload();
        if payload % ALIGNMENT != 0 {
            violations.push(Violation::MisalignedPayload(payload));
        }
        let size = block.size(&self.segment);
        if size < MIN_BLOCK_SIZE || size % ALIGNMENT != 0 {
            violations.push(Violation::BadBlockSize { payload, size });
        }
        if self.segment.word(block.header()) != self.segment.word(block.footer(&self.segment)) {
            violations.push(Violation::TagMismatch(payload));
        }
    }

    fn dump_block(&self, block: BlockView) {
        let seg = &self.segment;
        let footer = seg.word(block.footer(seg));
        debug!(
            "0x{:x}: header [{}:{}] footer [{}:{}]",
            block.payload(),
            block.size(seg),
            if block.is_allocated(seg) { 'a' } else { 'f' },
            tag_size(footer),
            if tag_allocated(footer) { 'a' } else { 'f' },
        );
    }
}
