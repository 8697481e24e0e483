/*!
 * Boundary-Tag Coalescing
 * Immediate merging of adjacent free blocks
 */

use super::HeapManager;
use crate::heap::block::BlockView;
use log::debug;

impl HeapManager {
    /// Merge `block` with free neighbors and return the resulting block
    ///
    /// Neighbor status comes straight from the boundary tags, so all four
    /// cases are O(1). Runs unconditionally on every free and every
    /// growth: find-fit depends on no two free blocks ever being adjacent.
    pub(super) fn coalesce(&mut self, block: BlockView) -> BlockView {
        let prev = block
            .prev(&self.segment)
            .filter(|p| !p.is_allocated(&self.segment));
        let next = block
            .next(&self.segment)
            .filter(|n| !n.is_allocated(&self.segment));

        let size = block.size(&self.segment);
        let merged = match (prev, next) {
            (None, None) => block,
            (None, Some(next)) => {
                let merged_size = size + next.size(&self.segment);
                block.write_tags(&mut self.segment, merged_size, false);
                block
            }
            (Some(prev), None) => {
                let merged_size = size + prev.size(&self.segment);
                prev.write_tags(&mut self.segment, merged_size, false);
                prev
            }
            (Some(prev), Some(next)) => {
                let merged_size = size + prev.size(&self.segment) + next.size(&self.segment);
                prev.write_tags(&mut self.segment, merged_size, false);
                prev
            }
        };

        // A merge that swallowed the rover's block would leave the cursor
        // mid-block, where the next scan would misparse tags; park it on
        // the merged block instead
        let span = merged.size(&self.segment);
        if self.rover > merged.payload() && self.rover < merged.payload() + span {
            debug!(
                "rover 0x{:x} swallowed by merge, reset to 0x{:x}",
                self.rover,
                merged.payload()
            );
            self.rover = merged.payload();
        }

        merged
    }
}
