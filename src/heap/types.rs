/*!
 * Heap Types
 * Errors, statistics, and metadata for the allocator
 */

use crate::core::limits::TAG_OVERHEAD;
use crate::core::types::{Address, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heap operation result
pub type HeapResult<T> = Result<T, HeapError>;

/// Heap errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    #[error("heap bootstrap failed: growth primitive refused {requested} bytes")]
    InitFailed { requested: Size },

    #[error("heap exhausted: requested {requested} bytes, {available} bytes left of {limit} byte limit")]
    Exhausted {
        requested: Size,
        available: Size,
        limit: Size,
    },

    #[error("request below minimum usable payload: {0} bytes")]
    RequestTooSmall(Size),

    #[error("access outside any allocated payload: offset 0x{offset:x}, length {len}")]
    InvalidAccess { offset: Address, len: Size },
}

/// Block metadata snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub payload: Address,
    pub size: Size,
    pub allocated: bool,
}

impl BlockInfo {
    /// Usable payload bytes inside this block
    pub fn payload_capacity(&self) -> Size {
        self.size - TAG_OVERHEAD
    }
}

/// Heap statistics, computed by walking the block chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapStats {
    pub heap_bytes: Size,
    pub allocated_bytes: Size,
    pub free_bytes: Size,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
}

impl HeapStats {
    /// Fraction of block bytes currently allocated, as a percentage
    pub fn utilization(&self) -> f64 {
        let total = self.allocated_bytes + self.free_bytes;
        if total == 0 {
            return 0.0;
        }
        (self.allocated_bytes as f64 / total as f64) * 100.0
    }
}

/// Consistency violations reported by the checker
///
/// Diagnostic data, not errors: violations are reported and logged, never
/// auto-repaired.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    #[error("payload offset 0x{0:x} is not doubleword aligned")]
    MisalignedPayload(Address),

    #[error("header does not match footer at payload 0x{0:x}")]
    TagMismatch(Address),

    #[error("block at payload 0x{payload:x} has malformed size {size}")]
    BadBlockSize { payload: Address, size: Size },

    #[error("adjacent free blocks at payloads 0x{first:x} and 0x{second:x}")]
    AdjacentFree { first: Address, second: Address },

    #[error("bad prologue block")]
    BadPrologue,

    #[error("bad epilogue header")]
    BadEpilogue,
}
