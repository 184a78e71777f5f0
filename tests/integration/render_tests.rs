//! Artifact rendering through the public entry point.

use tankguard::config::{ControllerConfig, ControllerVariant, FillMode};
use tankguard::error::Error;
use tankguard::program::{ArtifactKind, render};
use tankguard::topology::Topology;

fn config(variant: ControllerVariant) -> ControllerConfig {
    let mut c = ControllerConfig::default();
    c.variant = variant;
    c
}

#[test]
fn instruction_list_wires_estop_and_overloads_only_on_forty_point() {
    let small = render(
        ArtifactKind::InstructionList,
        &Topology::default(),
        &config(ControllerVariant::Tm221Ce24t),
    )
    .unwrap();
    let large = render(
        ArtifactKind::InstructionList,
        &Topology::default(),
        &config(ControllerVariant::Tm221Ce40t),
    )
    .unwrap();

    assert_eq!(small.matches("(* Rung ").count(), 22);
    assert_eq!(large.matches("(* Rung ").count(), 22);
    assert!(!small.contains("E_STOP"));
    assert!(large.contains("ANDN  %I0.2"));
    assert!(large.contains("PUMP1_OL"));
    assert!(small.contains("(* Controller: TM221CE24T"));
}

#[test]
fn band_mode_holds_the_command_until_high() {
    let mut c = ControllerConfig::default();
    c.fill_mode = FillMode::Band;
    let il = render(ArtifactKind::InstructionList, &Topology::default(), &c).unwrap();
    assert!(il.contains("AND(  %I0.5"));
    assert!(il.contains("OR    %M1"));
}

#[test]
fn project_file_carries_the_chosen_time_base() {
    let xml = render(ArtifactKind::Smbp, &Topology::baseline(0.5), &ControllerConfig::default())
        .unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<TimeBase>TimeBase100ms</TimeBase><Preset>5</Preset>"));
    assert!(xml.contains("TM221CE24T"));
    assert_eq!(xml.matches("<DigitalInput>").count(), 12);
}

#[test]
fn document_lists_backup_routes_and_procedures() {
    let md = render(
        ArtifactKind::Markdown,
        &Topology::default(),
        &config(ControllerVariant::Tm221Ce40t),
    )
    .unwrap();
    assert!(md.contains("## 2. System Architecture"));
    assert!(md.contains("Pump 2 fills Tank 1"));
    assert!(md.contains("## 5. Operating Procedures"));
    assert!(md.contains("emergency stop"));
}

#[test]
fn every_artifact_is_deterministic() {
    for kind in [ArtifactKind::InstructionList, ArtifactKind::Smbp, ArtifactKind::Markdown] {
        let c = ControllerConfig::default();
        let a = render(kind, &Topology::default(), &c).unwrap();
        let b = render(kind, &Topology::default(), &c).unwrap();
        assert_eq!(a, b, "{kind}");
    }
}

#[test]
fn unusable_inputs_are_refused() {
    let mut bad = ControllerConfig::default();
    bad.project_name.clear();
    assert!(matches!(
        render(ArtifactKind::Markdown, &Topology::default(), &bad),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        render(ArtifactKind::Smbp, &Topology::baseline(0.0004), &ControllerConfig::default()),
        Err(Error::Render(_))
    ));
}
