//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (console via `env_logger` in the CLI).  An HMI or
//! SCADA adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

fn bits<const N: usize>(v: &[bool; N]) -> String {
    v.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

/// Adapter that logs every [`AppEvent`] as a one-line record.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | t={:.2}s scans={} | run={} | pumps={} | low={} high={} | \
                     backup={} | faults=0b{:03b}",
                    t.uptime_secs,
                    t.scans,
                    if t.running { "ON" } else { "OFF" },
                    bits(&t.pump_run),
                    bits(&t.tank_low),
                    bits(&t.tank_high),
                    bits(&t.backup),
                    t.fault_flags,
                );
            }
            AppEvent::SystemStarted => info!("STATE | system running"),
            AppEvent::SystemStopped => info!("STATE | system stopped"),
            AppEvent::FaultLatched(pump) => warn!("FAULT | {pump} latched (zero speed)"),
            AppEvent::FaultCleared(pump) => info!("FAULT | {pump} cleared"),
            AppEvent::BackupEngaged(route) => warn!("BACKUP | engaged {route}"),
            AppEvent::BackupReleased(route) => info!("BACKUP | released {route}"),
            AppEvent::ScanRejected(reason) => warn!("SCAN | rejected: {reason}"),
            AppEvent::Started(variant) => info!("START | controller={}", variant.model()),
        }
    }
}

/// Sink that keeps every event, for tests and the CLI summary.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Fan one event out to two sinks.
pub struct Tee<'a, A, B>(pub &'a mut A, pub &'a mut B);

impl<A: EventSink, B: EventSink> EventSink for Tee<'_, A, B> {
    fn emit(&mut self, event: &AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
