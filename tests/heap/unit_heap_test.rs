/*!
 * Heap Unit Tests
 * Bootstrap, allocation contracts, payload access, and reallocation
 */

use flatheap::core::limits::{CHUNK_SIZE, FIRST_BLOCK_OFFSET};
use flatheap::{Allocator, HeapError, HeapManager, HeapResult};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_bootstrap_layout() {
    init_logging();
    let heap = HeapManager::new().unwrap();

    assert_eq!(heap.heap_size(), FIRST_BLOCK_OFFSET + CHUNK_SIZE);

    let stats = heap.stats();
    assert_eq!(stats.allocated_blocks, 0);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.free_bytes, CHUNK_SIZE);
    assert_eq!(stats.largest_free_block, CHUNK_SIZE);
    assert_eq!(stats.utilization(), 0.0);

    assert!(heap.check(true).is_empty());
}

#[test]
fn test_bootstrap_refusal_is_fatal() {
    // not even room for the sentinels
    assert_eq!(
        HeapManager::with_limit(8).unwrap_err(),
        HeapError::InitFailed { requested: 16 }
    );

    // sentinels fit but the initial chunk does not
    assert_eq!(
        HeapManager::with_limit(100).unwrap_err(),
        HeapError::InitFailed {
            requested: CHUNK_SIZE
        }
    );
}

#[test]
fn test_allocation_is_aligned_and_sufficient() {
    let mut heap = HeapManager::new().unwrap();

    for size in [1, 7, 100, 513, 2048] {
        let payload = heap.allocate(size).unwrap();
        assert_eq!(payload % 8, 0, "payload 0x{:x} misaligned", payload);

        let info = heap
            .blocks()
            .into_iter()
            .find(|b| b.payload == payload)
            .unwrap();
        assert!(info.allocated);
        assert!(info.payload_capacity() >= size);
    }
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_degenerate_request_rejected() {
    let mut heap = HeapManager::new().unwrap();
    assert_eq!(heap.allocate(0).unwrap_err(), HeapError::RequestTooSmall(0));

    // the rejection leaves the heap fully usable
    assert!(heap.allocate(100).is_ok());
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_payload_roundtrip() {
    let mut heap = HeapManager::new().unwrap();
    let payload = heap.allocate(32).unwrap();

    heap.write_bytes(payload, &[7u8; 32]).unwrap();
    assert_eq!(heap.read_bytes(payload, 32).unwrap(), vec![7u8; 32]);
}

#[test]
fn test_access_outside_payload_rejected() {
    let mut heap = HeapManager::new().unwrap();
    let payload = heap.allocate(16).unwrap();

    // past the payload capacity of the owning block
    assert_eq!(
        heap.read_bytes(payload, 64).unwrap_err(),
        HeapError::InvalidAccess {
            offset: payload,
            len: 64
        }
    );

    // nowhere near any block
    let wild = heap.heap_size() + 1024;
    assert!(matches!(
        heap.read_bytes(wild, 1).unwrap_err(),
        HeapError::InvalidAccess { .. }
    ));

    // freed payloads are no longer accessible
    heap.free(payload);
    assert!(heap.read_bytes(payload, 1).is_err());
    assert!(heap.write_bytes(payload, &[0]).is_err());
}

#[test]
fn test_reuse_after_free_does_not_overlap_live_block() {
    init_logging();
    let mut heap = HeapManager::new().unwrap();

    let first = heap.allocate(100).unwrap();
    let second = heap.allocate(200).unwrap();
    assert!(heap.check(false).is_empty());

    heap.free(first);
    assert!(heap.check(false).is_empty());

    let third = heap.allocate(64).unwrap();
    assert!(heap.check(false).is_empty());

    let blocks = heap.blocks();
    let live = blocks.iter().find(|b| b.payload == second).unwrap();
    let fresh = blocks.iter().find(|b| b.payload == third).unwrap();
    assert!(
        fresh.payload + fresh.size <= live.payload || live.payload + live.size <= fresh.payload,
        "allocation at 0x{:x} overlaps the live block at 0x{:x}",
        fresh.payload,
        live.payload
    );
}

#[test]
fn test_round_trip_restores_free_bytes() {
    let mut heap = HeapManager::new().unwrap();
    let before = heap.stats().free_bytes;

    let payload = heap.allocate(100).unwrap();
    heap.free(payload);

    assert_eq!(heap.stats().free_bytes, before);
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_reallocate_moves_data_and_frees_old_block() {
    let mut heap = HeapManager::new().unwrap();
    let data: Vec<u8> = (0..64u8).collect();

    let old = heap.allocate(64).unwrap();
    heap.write_bytes(old, &data).unwrap();

    let new = heap.reallocate(old, 256).unwrap();
    assert_ne!(old, new);
    assert_eq!(heap.read_bytes(new, 64).unwrap(), data);

    // the source block was freed
    assert!(heap.read_bytes(old, 1).is_err());
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_reallocate_shrink_copies_prefix() {
    let mut heap = HeapManager::new().unwrap();
    let data: Vec<u8> = (0..100u8).collect();

    let old = heap.allocate(100).unwrap();
    heap.write_bytes(old, &data).unwrap();

    let new = heap.reallocate(old, 40).unwrap();
    assert_eq!(heap.read_bytes(new, 40).unwrap(), data[..40].to_vec());
}

#[test]
fn test_reallocate_failure_leaves_original_intact() {
    // a heap that cannot grow past its initial chunk
    let mut heap = HeapManager::with_limit(FIRST_BLOCK_OFFSET + CHUNK_SIZE).unwrap();
    let data = vec![0xa5u8; 1000];

    let payload = heap.allocate(1000).unwrap();
    heap.write_bytes(payload, &data).unwrap();

    let err = heap.reallocate(payload, 8000).unwrap_err();
    assert!(matches!(err, HeapError::Exhausted { .. }));

    // the original allocation survived the failed move
    assert_eq!(heap.read_bytes(payload, 1000).unwrap(), data);
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_allocator_trait_seam() {
    fn exercise<A: Allocator>(alloc: &mut A) -> HeapResult<()> {
        let p = alloc.allocate(64)?;
        let q = alloc.reallocate(p, 128)?;
        alloc.free(q);
        Ok(())
    }

    let mut heap = HeapManager::new().unwrap();
    exercise(&mut heap).unwrap();
    assert!(heap.check(false).is_empty());
}

#[test]
fn test_utilization_tracks_allocations() {
    let mut heap = HeapManager::new().unwrap();
    assert_eq!(heap.stats().utilization(), 0.0);

    let payload = heap.allocate(2048).unwrap();
    assert!(heap.stats().utilization() > 50.0);

    heap.free(payload);
    assert_eq!(heap.stats().utilization(), 0.0);
}
