//! Fault history and runtime diagnostics.
//!
//! Stores up to 8 fault entries in a ring buffer under the "faults"
//! namespace of a [`StoragePort`].  Each entry captures scan time, pump,
//! edge kind and a short note.  Entries are postcard blobs, so the history
//! survives a controller restart when the store is persistent.
//!
//! Runtime metrics are assembled on demand for the diagnostics command.

use serde::{Deserialize, Serialize};

use crate::app::ports::StoragePort;
use crate::topology::PumpId;

pub const FAULT_RING_SLOTS: usize = 8;
const FAULT_NAMESPACE: &str = "faults";
const FAULT_INDEX_KEY: &str = "fault_idx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    Latched,
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultEntry {
    /// Controller uptime at the scan that saw the edge.
    pub uptime_secs: f32,
    pub pump: PumpId,
    pub kind: FaultKind,
    pub note: heapless::String<48>,
}

impl FaultEntry {
    pub fn new(uptime_secs: f32, pump: PumpId, kind: FaultKind, note: &str) -> Self {
        let mut n = heapless::String::new();
        for c in note.chars() {
            if n.push(c).is_err() {
                break;
            }
        }
        Self {
            uptime_secs,
            pump,
            kind,
            note: n,
        }
    }
}

/// Ring buffer of fault entries over a [`StoragePort`].
#[derive(Debug, Default)]
pub struct FaultHistory {
    write_index: usize,
}

impl FaultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index from storage, or default to 0.
    pub fn init(&mut self, store: &dyn StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = store.read(FAULT_NAMESPACE, FAULT_INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % FAULT_RING_SLOTS;
        }
    }

    /// Write an entry to the next ring slot and advance the index.
    pub fn record(&mut self, store: &mut dyn StoragePort, entry: &FaultEntry) {
        let slot_key = Self::slot_key(self.write_index);
        match postcard::to_allocvec(entry) {
            Ok(bytes) => {
                if let Err(e) = store.write(FAULT_NAMESPACE, &slot_key, &bytes) {
                    log::warn!("Fault history write failed: {e}");
                }
            }
            Err(e) => log::warn!("Fault history encode failed: {e}"),
        }

        self.write_index = (self.write_index + 1) % FAULT_RING_SLOTS;
        let idx_bytes = (self.write_index as u32).to_le_bytes();
        let _ = store.write(FAULT_NAMESPACE, FAULT_INDEX_KEY, &idx_bytes);
    }

    /// All stored entries, oldest first.
    pub fn read_all(&self, store: &dyn StoragePort) -> heapless::Vec<FaultEntry, FAULT_RING_SLOTS> {
        let mut entries = heapless::Vec::new();
        for n in 0..FAULT_RING_SLOTS {
            let slot_key = Self::slot_key((self.write_index + n) % FAULT_RING_SLOTS);
            let mut buf = [0u8; 128];
            if let Ok(len) = store.read(FAULT_NAMESPACE, &slot_key, &mut buf) {
                if let Ok(entry) = postcard::from_bytes::<FaultEntry>(&buf[..len]) {
                    let _ = entries.push(entry);
                }
            }
        }
        entries
    }

    /// Erase all entries and reset the index.
    pub fn clear(&mut self, store: &mut dyn StoragePort) {
        for i in 0..FAULT_RING_SLOTS {
            let _ = store.delete(FAULT_NAMESPACE, &Self::slot_key(i));
        }
        let _ = store.delete(FAULT_NAMESPACE, FAULT_INDEX_KEY);
        self.write_index = 0;
    }

    pub fn count(&self, store: &dyn StoragePort) -> usize {
        (0..FAULT_RING_SLOTS)
            .filter(|i| store.exists(FAULT_NAMESPACE, &Self::slot_key(*i)))
            .count()
    }

    fn slot_key(index: usize) -> heapless::String<16> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("f{}", index));
        s
    }
}

/// Runtime diagnostics snapshot collected on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeMetrics {
    pub uptime_secs: f32,
    pub scans: u64,
    pub rejected_scans: u64,
    pub fault_events: u32,
    pub backup_engagements: u32,
    pub history_entries: usize,
    pub active_faults: u8,
}
