//! Symbol-keyed process image.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Discrete signal values keyed by symbol (`TANK1_LOW`, `PUMP2_RUN`, …).
///
/// Serialises as a flat JSON object, so a scan's inputs can be written by
/// hand: `{"START_BTN": true, "TANK1_LOW": true, …}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IoImage {
    bits: BTreeMap<String, bool>,
}

impl IoImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<bool> {
        self.bits.get(symbol).copied()
    }

    pub fn set(&mut self, symbol: &str, value: bool) {
        self.bits.insert(symbol.to_owned(), value);
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, symbol: &str, value: bool) -> Self {
        self.set(symbol, value);
        self
    }

    pub fn remove(&mut self, symbol: &str) -> Option<bool> {
        self.bits.remove(symbol)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Symbols currently true, in sorted order.
    pub fn asserted(&self) -> impl Iterator<Item = &str> {
        self.bits
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
    }
}
