//! Operator documentation in Markdown.

use core::fmt::Write;

use super::rungs::{IlOp, Program};
use crate::config::FillMode;
use crate::io::IoPoint;
use crate::topology::RouteId;

pub fn render(p: &Program) -> String {
    let mut d = String::new();
    let secs = p.timers.first().map_or(0, |t| t.preset);
    let base = p.timers.first().map_or("", |t| t.time_base.tag());

    let _ = writeln!(d, "# {} - Program Documentation", p.project_name);
    let _ = writeln!(d);
    let _ = writeln!(d, "Controller: **{}**  ", p.variant.model());
    let _ = writeln!(d, "Program unit: `{}`  ", p.pou_name());
    let _ = writeln!(d, "MAST task interval: {} ms", p.scan_interval_ms);

    // 1
    let _ = writeln!(d, "\n## 1. Overview\n");
    let _ = writeln!(
        d,
        "Three pumps each fill their own tank. When a pump stops turning while \
         commanded, its fault latches and the next pump along fills the tank \
         through the interconnecting valve until the fault is reset."
    );

    // 2
    let _ = writeln!(d, "\n## 2. System Architecture\n");
    let _ = writeln!(d, "### Normal Operation\n");
    let _ = writeln!(d, "- Pump 1 fills Tank 1");
    let _ = writeln!(d, "- Pump 2 fills Tank 2");
    let _ = writeln!(d, "- Pump 3 fills Tank 3");
    match p.fill_mode {
        FillMode::LevelSwitch => {
            let _ = writeln!(d, "- A pump runs while its tank's low switch is made and the high switch is not");
        }
        FillMode::Band => {
            let _ = writeln!(d, "- A pump starts at the low switch and runs until the high switch makes");
        }
    }
    let _ = writeln!(d, "\n### Backup Operation\n");
    for id in RouteId::ALL {
        let r = id.route();
        let _ = writeln!(
            d,
            "- Pump {} fault: Pump {} fills Tank {} via Valve {}",
            r.primary.number(),
            r.backup.number(),
            r.tank().number(),
            r.valve.label()
        );
    }
    let _ = writeln!(d, "- Pump 3 fault: no backup route, Tank 3 waits for a reset");

    // 3
    let _ = writeln!(d, "\n## 3. I/O Assignment\n");
    let _ = writeln!(d, "### Digital Inputs\n");
    io_table(&mut d, p.map.inputs());
    let _ = writeln!(d, "\n### Digital Outputs\n");
    io_table(&mut d, p.map.outputs());

    let _ = writeln!(d, "\n### Memory Bits\n");
    let _ = writeln!(d, "| Address | Symbol | Description |");
    let _ = writeln!(d, "|---------|--------|-------------|");
    for m in &p.memory {
        let _ = writeln!(d, "| {} | {} | {} |", m.address, m.symbol, m.comment);
    }

    let _ = writeln!(d, "\n### Timers\n");
    let _ = writeln!(d, "| Address | Symbol | Type | Time base | Preset |");
    let _ = writeln!(d, "|---------|--------|------|-----------|--------|");
    for t in &p.timers {
        let _ = writeln!(
            d,
            "| {} | {} | TON | {} | {} |",
            t.address,
            t.symbol,
            t.time_base.tag(),
            t.preset
        );
    }

    // 4
    let _ = writeln!(d, "\n## 4. Program Logic\n");
    for rung in &p.rungs {
        let _ = writeln!(d, "### Rung {}: {}\n", rung.number, rung.title);
        let _ = writeln!(d, "```");
        for line in &rung.lines {
            let _ = writeln!(d, "{}", line.instruction());
        }
        let _ = writeln!(d, "```");
        if let Some(st) = rung.lines.iter().rev().find(|l| l.op == IlOp::St) {
            let _ = writeln!(d, "\nWrites `{}`.", st.comment);
        }
        let _ = writeln!(d);
    }

    // 5
    let _ = writeln!(d, "## 5. Operating Procedures\n");
    let _ = writeln!(d, "### System Startup\n");
    let _ = writeln!(d, "1. Check all level switches and speed sensors are connected");
    if p.map.is_wired(crate::io::sym::E_STOP) {
        let _ = writeln!(d, "2. Release the emergency stop");
        let _ = writeln!(d, "3. Press START; the running lamp lights");
        let _ = writeln!(d, "4. Pumps run as their tanks call for water");
    } else {
        let _ = writeln!(d, "2. Press START; the running lamp lights");
        let _ = writeln!(d, "3. Pumps run as their tanks call for water");
    }
    let _ = writeln!(d, "\n### Fault Handling\n");
    let _ = writeln!(
        d,
        "1. A pump that shows no speed {secs} ticks ({base}) after being commanded latches its fault"
    );
    let _ = writeln!(d, "2. The pump's fault lamp and the alarm horn switch on");
    let _ = writeln!(d, "3. If a backup route exists the next pump fills the tank through its valve");
    let _ = writeln!(d, "4. Repair the pump, confirm its speed sensor reads healthy, then press FAULT RESET");
    let _ = writeln!(d, "5. A reset pressed while the sensor still reads zero speed is ignored");
    d
}

fn io_table(d: &mut String, points: &[IoPoint]) {
    let _ = writeln!(d, "| Address | Symbol | Description | Type |");
    let _ = writeln!(d, "|---------|--------|-------------|------|");
    for pt in points {
        let _ = writeln!(
            d,
            "| {} | {} | {} | {} |",
            pt.address,
            pt.symbol,
            pt.description,
            pt.contact.abbrev()
        );
    }
}
