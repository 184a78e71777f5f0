//! Plain-text Instruction List listing.

use core::fmt::Write;

use super::rungs::Program;

/// Render the whole program as an IL listing with `(* … *)` comments.
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "(* {} *)", program.pou_name());
    let _ = writeln!(
        out,
        "(* Controller: {}  MAST task: {} ms *)",
        program.variant.model(),
        program.scan_interval_ms
    );

    for rung in &program.rungs {
        let _ = writeln!(out);
        let _ = writeln!(out, "(* Rung {}: {} *)", rung.number, rung.title);
        for line in &rung.lines {
            let instr = line.instruction();
            if line.comment.is_empty() {
                let _ = writeln!(out, "{instr}");
            } else {
                let _ = writeln!(out, "{instr:<16}(* {} *)", line.comment);
            }
        }
    }
    out
}
