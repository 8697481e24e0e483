/*!
 * Heap Allocation
 *
 * Implicit-free-list allocator over a simulated flat heap.
 *
 * ## Design
 *
 * - **Boundary tags**: every block carries its size and allocated flag in a
 *   header and a byte-identical footer, so both neighbors of any block are
 *   reachable in O(1) without a linked free list.
 * - **Next-fit search**: a persistent cursor biases the first-fit scan to
 *   pick up where the last allocation left off, trading strict address
 *   order for fewer long scans on allocation bursts.
 * - **Immediate coalescing**: every free and every growth merges adjacent
 *   free blocks on the spot; no two free blocks are ever adjacent.
 * - **Splitting**: an oversized free block is split in place whenever the
 *   remainder can stand as a block of its own.
 *
 * The allocator trades throughput for structural simplicity: one segment,
 * one cursor, no size classes.
 */

pub mod block;
pub mod manager;
pub mod segment;
pub mod traits;
pub mod types;

// Re-export public types and traits
pub use block::BlockView;
pub use manager::HeapManager;
pub use segment::HeapSegment;
pub use traits::{Allocator, HeapInspect};
pub use types::{BlockInfo, HeapError, HeapResult, HeapStats, Violation};
