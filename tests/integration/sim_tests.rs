//! Closed-loop runs: the control service scanning a simulated plant
//! through the controller's own I/O map.

use tankguard::adapters::log_sink::RecordingSink;
use tankguard::app::events::AppEvent;
use tankguard::config::{ControllerConfig, ControllerVariant};
use tankguard::sim::{PlantParams, Simulation};
use tankguard::topology::{PumpId, RouteId, TankId};

fn sim(variant: ControllerVariant, sink: &mut RecordingSink) -> Simulation {
    let mut config = ControllerConfig::default();
    config.variant = variant;
    Simulation::new(config, PlantParams::default(), sink).unwrap()
}

#[test]
fn seized_pump_is_backed_up_and_its_tank_keeps_water() {
    let mut sink = RecordingSink::new();
    let mut s = sim(ControllerVariant::Tm221Ce24t, &mut sink);
    s.plant.seize_pump(PumpId::P1);
    s.plant.press_start();

    s.run_for(3.0, &mut sink).unwrap();
    assert!(s.service.latched().fault(PumpId::P1));
    assert!(sink.events.contains(&AppEvent::FaultLatched(PumpId::P1)));
    assert!(sink.events.contains(&AppEvent::BackupEngaged(RouteId::Tank1ViaPump2)));
    assert_eq!(
        s.plant.open_routes().collect::<Vec<_>>(),
        vec![RouteId::Tank1ViaPump2]
    );
    assert!(s.service.outputs().alarm);

    s.run_for(30.0, &mut sink).unwrap();
    assert!(s.plant.lowest_level(TankId::T1) > 15.0);
    assert!(s.plant.level(TankId::T1) > 25.0);
    // Pump 2 never stalls, so its own tank is never left behind.
    assert!(!s.service.latched().fault(PumpId::P2));
}

#[test]
fn repaired_pump_is_reset_after_a_hand_jog() {
    let mut sink = RecordingSink::new();
    let mut s = sim(ControllerVariant::Tm221Ce24t, &mut sink);
    s.plant.seize_pump(PumpId::P1);
    s.plant.press_start();
    s.run_for(3.0, &mut sink).unwrap();

    // Reset without proof of rotation is ignored.
    s.plant.repair_pump(PumpId::P1);
    s.plant.press_fault_reset();
    s.tick(&mut sink).unwrap();
    assert!(s.service.latched().fault(PumpId::P1));

    s.plant.jog_pump(PumpId::P1, 1.0);
    s.plant.press_fault_reset();
    s.tick(&mut sink).unwrap();
    assert!(!s.service.latched().fault(PumpId::P1));
    assert!(sink.events.contains(&AppEvent::FaultCleared(PumpId::P1)));
    assert!(!s.service.outputs().alarm);

    s.run_for(5.0, &mut sink).unwrap();
    assert!(!s.service.latched().fault(PumpId::P1));
}

#[test]
fn emergency_stop_drops_the_run_latch() {
    let mut sink = RecordingSink::new();
    let mut s = sim(ControllerVariant::Tm221Ce40t, &mut sink);
    s.plant.press_start();
    s.run_for(1.0, &mut sink).unwrap();
    assert!(s.service.latched().running);

    s.plant.set_estop(true);
    s.tick(&mut sink).unwrap();
    assert!(!s.service.latched().running);
    assert_eq!(s.service.outputs().pump_run, [false; 3]);
    assert!(sink.events.contains(&AppEvent::SystemStopped));

    // Releasing the stop does not restart the system.
    s.plant.set_estop(false);
    s.run_for(0.5, &mut sink).unwrap();
    assert!(!s.service.latched().running);
}

#[test]
fn overload_blocks_the_command_without_latching_a_fault() {
    let mut sink = RecordingSink::new();
    let mut s = sim(ControllerVariant::Tm221Ce40t, &mut sink);
    s.plant.set_overload(PumpId::P1, true);
    s.plant.press_start();
    s.run_for(2.5, &mut sink).unwrap();

    assert!(!s.service.outputs().pump(PumpId::P1));
    assert!(!s.service.latched().fault(PumpId::P1));
    assert!(s.plant.open_routes().next().is_none());
    assert!(s.service.outputs().pump(PumpId::P2));
}

#[test]
fn tanks_settle_between_the_switches() {
    let mut sink = RecordingSink::new();
    let mut s = sim(ControllerVariant::Tm221Ce24t, &mut sink);
    s.plant.press_start();
    s.run_for(60.0, &mut sink).unwrap();

    let params = PlantParams::default();
    for level in s.levels() {
        assert!(level > params.low_switch_pct - 2.0, "level {level}");
        assert!(level < params.high_switch_pct);
    }
    assert!(!s.service.latched().any_fault());
}
