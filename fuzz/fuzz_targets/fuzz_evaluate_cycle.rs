//! Fuzz target: policy evaluator over arbitrary scan sequences
//!
//! Each 3-byte chunk is one scan: two bytes of input bits and one byte
//! selecting the scan interval.  Checks after every scan:
//! - No panics
//! - Alarm equals the OR of the fault latches
//! - A pump faulted on the previous scan is not commanded
//! - Timers never pass the preset
//!
//! cargo fuzz run fuzz_evaluate_cycle

#![no_main]

use libfuzzer_sys::fuzz_target;
use tankguard::policy::{InputSnapshot, LatchedState, PumpInputs, TankInputs, TimerState, evaluate_cycle};

const PRESET_US: u32 = 2_000_000;

fn decode(bits: u16) -> InputSnapshot {
    let bit = |n: u16| bits & (1 << n) != 0;
    InputSnapshot {
        start: bit(0),
        stop: bit(1),
        estop: None,
        fault_reset: bit(2),
        pumps: [3, 4, 5].map(|n| PumpInputs {
            speed_ok: bit(n),
            overload: None,
        }),
        tanks: [(6, 7), (8, 9), (10, 11)].map(|(l, h)| TankInputs {
            low: bit(l),
            high: bit(h),
        }),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut latched = LatchedState::default();
    let mut timers = TimerState::default();

    for chunk in data.chunks_exact(3) {
        let inputs = decode(u16::from_le_bytes([chunk[0], chunk[1]]));
        let dt = (f32::from(chunk[2]) + 1.0) / 100.0;

        let Ok(out) = evaluate_cycle(&inputs, &latched, &timers, dt) else {
            panic!("valid interval rejected: {dt}");
        };

        assert_eq!(out.outputs.alarm, out.latched.faults.iter().any(|f| *f));
        for (i, faulted) in latched.faults.iter().enumerate() {
            if *faulted {
                assert!(!out.latched.commands[i]);
            }
        }
        for t in out.timers.timers {
            assert!(t.elapsed_us() <= PRESET_US);
        }

        latched = out.latched;
        timers = out.timers;
    }
});
