/*!
 * Payload Storage Access
 * Bounds-checked reads and writes into allocated payloads
 */

use super::HeapManager;
use crate::core::types::{Address, Size};
use crate::heap::types::{HeapError, HeapResult};
use log::warn;

impl HeapManager {
    /// Write `data` into an allocated payload
    ///
    /// The whole range must fall inside the payload of a single allocated
    /// block; the boundary tags say where that payload ends.
    pub fn write_bytes(&mut self, payload: Address, data: &[u8]) -> HeapResult<()> {
        self.validate_access(payload, data.len())?;
        self.segment
            .bytes_mut(payload, data.len())
            .copy_from_slice(data);
        Ok(())
    }

    /// Read `len` bytes out of an allocated payload
    pub fn read_bytes(&self, payload: Address, len: Size) -> HeapResult<Vec<u8>> {
        self.validate_access(payload, len)?;
        Ok(self.segment.bytes(payload, len).to_vec())
    }

    /// Check that `[payload, payload + len)` sits inside one allocated payload
    fn validate_access(&self, payload: Address, len: Size) -> HeapResult<()> {
        for block in self.block_chain() {
            let start = block.payload();
            let capacity = block.payload_capacity(&self.segment);
            if payload >= start && payload < start + capacity {
                if block.is_allocated(&self.segment) && payload + len <= start + capacity {
                    return Ok(());
                }
                break;
            }
        }
        warn!(
            "rejected access at 0x{:x} ({} bytes): outside any allocated payload",
            payload, len
        );
        Err(HeapError::InvalidAccess {
            offset: payload,
            len,
        })
    }
}
