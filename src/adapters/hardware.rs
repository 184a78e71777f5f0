//! Hardware adapter — bridges discrete pins to the domain port traits.
//!
//! Any `embedded-hal` 1.0 digital pin can be wired to a terminal from the
//! [`IoMap`].  Pin levels are the terminal states the PLC program sees; a
//! pin that cannot be read is reported as a missing signal rather than
//! guessed.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{InputPort, OutputPort};
use crate::error::InputError;
use crate::io::{IoImage, IoMap, IoPoint};
use crate::policy::{InputSnapshot, OutputSnapshot};

// ── Inputs ────────────────────────────────────────────────────

/// Input terminals backed by pins.
pub struct PinInputs<P> {
    map: IoMap,
    pins: Vec<(&'static IoPoint, P)>,
}

impl<P: InputPin> PinInputs<P> {
    /// Bind one pin to every input terminal of `map`.
    pub fn new(map: IoMap, mut pin_for: impl FnMut(&IoPoint) -> P) -> Self {
        let pins = map.inputs().iter().map(|p| (p, pin_for(p))).collect();
        Self { map, pins }
    }

    /// Sample every pin into an image.
    pub fn sample(&mut self) -> Result<IoImage, InputError> {
        let mut image = IoImage::new();
        for (point, pin) in &mut self.pins {
            let level = pin
                .is_high()
                .map_err(|_| InputError::MissingSignal(point.symbol))?;
            image.set(point.symbol, level);
        }
        Ok(image)
    }
}

impl<P: InputPin> InputPort for PinInputs<P> {
    fn read_inputs(&mut self) -> Result<InputSnapshot, InputError> {
        let image = self.sample()?;
        self.map.read_inputs(&image)
    }
}

// ── Outputs ───────────────────────────────────────────────────

/// Output terminals backed by pins.
pub struct PinOutputs<P> {
    map: IoMap,
    pins: Vec<(&'static IoPoint, P)>,
}

impl<P: OutputPin> PinOutputs<P> {
    /// Bind one pin to every output terminal of `map`.
    pub fn new(map: IoMap, mut pin_for: impl FnMut(&IoPoint) -> P) -> Self {
        let pins = map.outputs().iter().map(|p| (p, pin_for(p))).collect();
        Self { map, pins }
    }
}

impl<P: OutputPin> OutputPort for PinOutputs<P> {
    fn apply(&mut self, outputs: &OutputSnapshot) {
        let image = self.map.write_outputs(outputs);
        for (point, pin) in &mut self.pins {
            let state = PinState::from(image.get(point.symbol).unwrap_or(false));
            if pin.set_state(state).is_err() {
                warn!("Output {} ({}) write failed", point.symbol, point.address);
            }
        }
    }
}

// ── Combined ──────────────────────────────────────────────────

/// Concrete adapter that combines both directions behind the port traits.
pub struct PinIo<I, O> {
    pub inputs: PinInputs<I>,
    pub outputs: PinOutputs<O>,
}

impl<I: InputPin, O: OutputPin> InputPort for PinIo<I, O> {
    fn read_inputs(&mut self) -> Result<InputSnapshot, InputError> {
        self.inputs.read_inputs()
    }
}

impl<I: InputPin, O: OutputPin> OutputPort for PinIo<I, O> {
    fn apply(&mut self, outputs: &OutputSnapshot) {
        self.outputs.apply(outputs);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::{ErrorType, ErrorKind};

    use super::*;
    use crate::config::ControllerVariant;
    use crate::io::sym;

    #[derive(Clone, Default)]
    struct SharedPin(Rc<Cell<bool>>);

    impl ErrorType for SharedPin {
        type Error = Infallible;
    }

    impl InputPin for SharedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.get())
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.get())
        }
    }

    impl OutputPin for SharedPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl embedded_hal::digital::Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = Broken;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(Broken)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(Broken)
        }
    }

    #[test]
    fn pin_levels_become_snapshot_fields() {
        let map = IoMap::for_variant(ControllerVariant::Tm221Ce24t);
        let start = SharedPin::default();
        let low1 = SharedPin::default();
        let (s, l) = (start.clone(), low1.clone());
        let mut inputs = PinInputs::new(map, |p| match p.symbol {
            sym::START_BTN => s.clone(),
            "TANK1_LOW" => l.clone(),
            _ => SharedPin::default(),
        });

        start.0.set(true);
        low1.0.set(true);
        let snap = inputs.read_inputs().unwrap();
        assert!(snap.start);
        assert!(snap.tanks[0].low);
        assert!(!snap.tanks[1].low);
    }

    #[test]
    fn unreadable_pin_is_a_missing_signal() {
        let map = IoMap::for_variant(ControllerVariant::Tm221Ce24t);
        let mut inputs = PinInputs::new(map, |_| BrokenPin);
        assert_eq!(
            inputs.read_inputs(),
            Err(InputError::MissingSignal(sym::START_BTN))
        );
    }

    #[test]
    fn outputs_drive_their_pins() {
        let map = IoMap::for_variant(ControllerVariant::Tm221Ce40t);
        let alarm = SharedPin::default();
        let a = alarm.clone();
        let mut outputs = PinOutputs::new(map, |p| {
            if p.symbol == sym::ALARM_OUTPUT {
                a.clone()
            } else {
                SharedPin::default()
            }
        });
        outputs.apply(&OutputSnapshot {
            alarm: true,
            ..OutputSnapshot::default()
        });
        assert!(alarm.0.get());
        outputs.all_off();
        assert!(!alarm.0.get());
    }
}
