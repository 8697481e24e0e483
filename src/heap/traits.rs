/*!
 * Heap Traits
 * Allocator abstractions
 */

use super::types::{BlockInfo, HeapResult, HeapStats, Violation};
use crate::core::types::{Address, Size};

/// Dynamic allocator interface
pub trait Allocator {
    /// Allocate a block with at least `size` payload bytes
    fn allocate(&mut self, size: Size) -> HeapResult<Address>;

    /// Free a previously allocated payload
    ///
    /// The offset must have come from `allocate` on this heap and not been
    /// freed since; anything else is outside the contract.
    fn free(&mut self, payload: Address);

    /// Resize an allocation, moving it to a new block
    fn reallocate(&mut self, payload: Address, new_size: Size) -> HeapResult<Address>;
}

/// Read-only heap diagnostics
pub trait HeapInspect {
    /// Statistics over the block chain
    fn stats(&self) -> HeapStats;

    /// Snapshot of every block between the sentinels
    fn blocks(&self) -> Vec<BlockInfo>;

    /// Walk the heap and report consistency violations
    fn check(&self, verbose: bool) -> Vec<Violation>;
}
