//! Machine Expert Basic project (`.smbp`) writer.
//!
//! Emits the subset of the project XML the IDE needs to open an
//! Instruction-List program: task, POU with rungs, timers, I/O and memory
//! symbols, CPU model.  Output is deterministic (no timestamps).

use core::fmt::Write;

use super::rungs::Program;
use crate::io::IoPoint;

/// Escape the five XML special characters.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(p: &Program) -> String {
    let mut x = String::new();
    let name = escape(&p.project_name);

    let _ = writeln!(x, r#"<?xml version="1.0" encoding="utf-8"?>"#);
    let _ = writeln!(
        x,
        r#"<ProjectDescriptor xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">"#
    );
    let _ = writeln!(x, "  <ProjectVersion>3.0.0.0</ProjectVersion>");
    let _ = writeln!(x, "  <ManagementLevel>FunctLevelMan21_0</ManagementLevel>");
    let _ = writeln!(x, "  <Name>{name}</Name>");
    let _ = writeln!(x, "  <FullName>{name}.smbp</FullName>");
    let _ = writeln!(x, "  <CurrentCultureName>en-GB</CurrentCultureName>");

    // ── Software ──────────────────────────────────────────────
    let _ = writeln!(x, "  <SoftwareConfiguration>");
    let _ = writeln!(x, "    <TaskConfiguration>");
    let _ = writeln!(x, "      <TaskName>MAST</TaskName>");
    let _ = writeln!(x, "      <TaskInterval>{}</TaskInterval>", p.scan_interval_ms);
    let _ = writeln!(x, "    </TaskConfiguration>");

    let _ = writeln!(x, "    <Pous>");
    let _ = writeln!(x, "      <PouDescriptor>");
    let _ = writeln!(x, "        <Name>{}</Name>", escape(&p.pou_name()));
    let _ = writeln!(x, "        <PouType>Program</PouType>");
    let _ = writeln!(x, "        <Rungs>");
    for rung in &p.rungs {
        let _ = writeln!(x, "          <RungEntity>");
        let _ = writeln!(x, "            <LadderElements />");
        let _ = writeln!(x, "            <InstructionLines>");
        for line in &rung.lines {
            let _ = write!(
                x,
                "              <InstructionLineEntity><InstructionLine>{}</InstructionLine>",
                escape(&line.instruction())
            );
            if !line.comment.is_empty() {
                let _ = write!(x, "<Comment>{}</Comment>", escape(&line.comment));
            }
            let _ = writeln!(x, "</InstructionLineEntity>");
        }
        let _ = writeln!(x, "            </InstructionLines>");
        let _ = writeln!(x, "            <Name>Rung {}</Name>", rung.number);
        let _ = writeln!(x, "            <MainComment>{}</MainComment>", escape(&rung.title));
        let _ = writeln!(x, "            <Label />");
        let _ = writeln!(x, "            <IsLadderSelected>false</IsLadderSelected>");
        let _ = writeln!(x, "          </RungEntity>");
    }
    let _ = writeln!(x, "        </Rungs>");
    let _ = writeln!(x, "      </PouDescriptor>");
    let _ = writeln!(x, "    </Pous>");

    let _ = writeln!(x, "    <TimersMemoryAllocation>");
    let _ = writeln!(x, "      <Allocation>Manual</Allocation>");
    let _ = writeln!(x, "      <ForcedCount>{}</ForcedCount>", p.timers.len());
    let _ = writeln!(x, "    </TimersMemoryAllocation>");

    let _ = writeln!(x, "    <Timers>");
    for t in &p.timers {
        let _ = writeln!(
            x,
            "      <Timer><Address>{}</Address><Index>{}</Index><Symbol>{}</Symbol><Comment>{}</Comment><Type>TON</Type><TimeBase>{}</TimeBase><Preset>{}</Preset></Timer>",
            t.address,
            t.index,
            escape(&t.symbol),
            escape(&t.comment),
            t.time_base.tag(),
            t.preset
        );
    }
    let _ = writeln!(x, "    </Timers>");

    io_section(&mut x, "DigitalInputs", "DigitalInput", p.map.inputs());
    io_section(&mut x, "DigitalOutputs", "DigitalOutput", p.map.outputs());

    let _ = writeln!(x, "    <MemoryBits>");
    for m in &p.memory {
        let _ = writeln!(
            x,
            "      <MemoryBit><Address>{}</Address><Index>{}</Index><Symbol>{}</Symbol><Comment>{}</Comment></MemoryBit>",
            m.address,
            m.index,
            escape(&m.symbol),
            escape(&m.comment)
        );
    }
    let _ = writeln!(x, "    </MemoryBits>");
    let _ = writeln!(x, "  </SoftwareConfiguration>");

    // ── Hardware ──────────────────────────────────────────────
    let _ = writeln!(x, "  <HardwareConfiguration>");
    let _ = writeln!(x, "    <CpuConfiguration>");
    let _ = writeln!(x, "      <Model>{}</Model>", p.variant.model());
    let _ = writeln!(x, "      <DigitalInputCount>{}</DigitalInputCount>", p.variant.digital_inputs());
    let _ = writeln!(x, "      <DigitalOutputCount>{}</DigitalOutputCount>", p.variant.digital_outputs());
    let _ = writeln!(x, "    </CpuConfiguration>");
    let _ = writeln!(x, "  </HardwareConfiguration>");

    let _ = writeln!(x, "  <GlobalProperties>");
    let _ = writeln!(x, "    <Author>tankguard</Author>");
    let _ = writeln!(
        x,
        "    <Description>3-Pump 3-Tank Backup System for {}</Description>",
        p.variant.model()
    );
    let _ = writeln!(x, "  </GlobalProperties>");
    let _ = writeln!(x, "</ProjectDescriptor>");
    x
}

fn io_section(x: &mut String, outer: &str, inner: &str, points: &[IoPoint]) {
    let _ = writeln!(x, "    <{outer}>");
    for (i, pt) in points.iter().enumerate() {
        let _ = writeln!(
            x,
            "      <{inner}><Address>{}</Address><Index>{}</Index><Symbol>{}</Symbol><Comment>{} ({})</Comment></{inner}>",
            pt.address,
            pt.index().unwrap_or(i as u8),
            pt.symbol,
            escape(pt.description),
            pt.contact.abbrev()
        );
    }
    let _ = writeln!(x, "    </{outer}>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerConfig, ControllerVariant};
    use crate::topology::Topology;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"a<b & "c">"#), "a&lt;b &amp; &quot;c&quot;&gt;");
    }

    #[test]
    fn project_carries_model_timers_and_rungs() {
        let config = ControllerConfig {
            variant: ControllerVariant::Tm221Ce40t,
            ..ControllerConfig::default()
        };
        let p = Program::build(&Topology::default(), &config).unwrap();
        let xml = render(&p);
        assert!(xml.contains("<Model>TM221CE40T</Model>"));
        assert!(xml.contains("<TimeBase>TimeBase1s</TimeBase><Preset>2</Preset>"));
        assert_eq!(xml.matches("<RungEntity>").count(), 22);
        assert_eq!(xml.matches("<DigitalInput>").count(), 16);
        assert!(xml.contains("<Symbol>E_STOP</Symbol>"));
        assert!(xml.contains("<InstructionLine>ANDN( %I0.15</InstructionLine>"));
        assert!(xml.trim_end().ends_with("</ProjectDescriptor>"));
    }
}
