/*!
 * Heap Limits and Constants
 *
 * Centralized location for the allocator's layout constants and tunables.
 * Values include rationale comments explaining why they exist.
 */

use crate::core::types::Size;

/// Boundary tag word size (bytes)
/// Header and footer are each one word: block size packed with the allocated bit
pub const WORD_SIZE: Size = 4;

/// Alignment unit (bytes)
/// Every payload offset and every block size is a multiple of this doubleword
pub const ALIGNMENT: Size = 8;

/// Per-block overhead of header plus footer (bytes)
pub const TAG_OVERHEAD: Size = 2 * WORD_SIZE;

/// Minimum block size (bytes): header + footer + smallest usable payload
/// Split remainders below this floor stay inside the allocated block
pub const MIN_BLOCK_SIZE: Size = 16;

/// Default heap growth quantum (4KB)
/// Also the initial free region created at bootstrap
/// [PERF] One page amortizes growth-primitive round trips across small requests
pub const CHUNK_SIZE: Size = 4096;

/// Default cap for the simulated heap segment (16MB)
/// Growth beyond the cap is refused and surfaces as allocation exhaustion
pub const DEFAULT_HEAP_LIMIT: Size = 16 * 1024 * 1024;

/// Prologue payload offset: one pad word plus the prologue header
pub const PROLOGUE_OFFSET: Size = ALIGNMENT;

/// Payload offset of the first real block once the heap is bootstrapped
pub const FIRST_BLOCK_OFFSET: Size = 2 * ALIGNMENT;
