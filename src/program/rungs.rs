//! Rung table: the control program as Instruction List lines.
//!
//! The rungs are ordered so that a PLC executing them top to bottom sees the
//! same previous-scan values the policy evaluator uses: commands read the
//! fault bits before the fault rungs rewrite them, and the startup timers
//! read the backup bits before the backup rungs rewrite them.

use crate::config::{ControllerConfig, ControllerVariant, FillMode};
use crate::error::Error;
use crate::io::{IoMap, sym};
use crate::topology::{PumpId, RouteId, Topology};

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlOp {
    Ld,
    And,
    Andn,
    Or,
    St,
    /// `AND(` opens a parenthesised sub-expression.
    AndOpen,
    /// `ANDN(` opens a negated sub-expression.
    AndnOpen,
    Close,
    Blk,
    In,
    EndBlk,
}

impl IlOp {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Ld => "LD",
            Self::And => "AND",
            Self::Andn => "ANDN",
            Self::Or => "OR",
            Self::St => "ST",
            Self::AndOpen => "AND(",
            Self::AndnOpen => "ANDN(",
            Self::Close => ")",
            Self::Blk => "BLK",
            Self::In => "IN",
            Self::EndBlk => "END_BLK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlLine {
    pub op: IlOp,
    /// Address operand (`%I0.0`, `%M10`, `%TM0.Q`); absent for `IN`, `)` etc.
    pub operand: Option<String>,
    pub comment: String,
}

impl IlLine {
    /// `LD    %I0.0`
    pub fn instruction(&self) -> String {
        match &self.operand {
            Some(operand) => format!("{:<6}{}", self.op.mnemonic(), operand),
            None => self.op.mnemonic().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rung {
    pub number: usize,
    pub title: String,
    pub lines: Vec<IlLine>,
}

// ---------------------------------------------------------------------------
// Internal memory
// ---------------------------------------------------------------------------

/// A `%M` bit used by the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBit {
    pub address: String,
    pub index: u16,
    pub symbol: String,
    pub comment: String,
}

/// A `%TM` timer used by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerDef {
    pub address: String,
    pub index: u16,
    pub symbol: String,
    pub comment: String,
    pub time_base: TimeBase,
    pub preset: u32,
}

/// Timer tick sizes supported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBase {
    S1,
    Ms100,
    Ms10,
    Ms1,
}

impl TimeBase {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::S1 => "TimeBase1s",
            Self::Ms100 => "TimeBase100ms",
            Self::Ms10 => "TimeBase10ms",
            Self::Ms1 => "TimeBase1ms",
        }
    }

    const fn ticks_per_sec(self) -> f32 {
        match self {
            Self::S1 => 1.0,
            Self::Ms100 => 10.0,
            Self::Ms10 => 100.0,
            Self::Ms1 => 1000.0,
        }
    }

    /// Coarsest base that expresses `secs` exactly, with its preset count.
    pub fn for_preset(secs: f32) -> Option<(Self, u32)> {
        [Self::S1, Self::Ms100, Self::Ms10, Self::Ms1]
            .into_iter()
            .find_map(|base| {
                let ticks = secs * base.ticks_per_sec();
                let rounded = ticks.round();
                ((ticks - rounded).abs() < 1e-3 && rounded >= 1.0).then_some((base, rounded as u32))
            })
    }
}

const RUN_BIT: &str = "%M0";

fn cmd_bit(pump: PumpId) -> String {
    format!("%M{}", pump.number())
}

fn fault_bit(pump: PumpId) -> String {
    format!("%M{}", 10 + pump.index())
}

fn backup_bit(route: RouteId) -> String {
    format!("%M{}", 20 + route.index())
}

fn timer(pump: PumpId) -> String {
    format!("%TM{}", pump.index())
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

/// Everything an artifact writer needs.
#[derive(Debug, Clone)]
pub struct Program {
    pub project_name: String,
    pub variant: ControllerVariant,
    pub fill_mode: FillMode,
    pub scan_interval_ms: u32,
    pub map: IoMap,
    pub memory: Vec<MemoryBit>,
    pub timers: Vec<TimerDef>,
    pub rungs: Vec<Rung>,
}

impl Program {
    /// Lay out the full rung table for one controller.
    pub fn build(topology: &Topology, config: &ControllerConfig) -> Result<Self, Error> {
        let map = IoMap::for_variant(config.variant);
        let (time_base, preset) = TimeBase::for_preset(topology.timer_preset_secs)
            .ok_or(Error::Render("timer preset not expressible in any time base"))?;

        let mut b = Builder {
            map,
            rungs: Vec::new(),
            current: Vec::new(),
        };

        // Run latch
        b.ld_sym(sym::START_BTN)?;
        b.line(IlOp::Or, RUN_BIT, "Seal-in");
        b.andn_sym(sym::STOP_BTN)?;
        if map.is_wired(sym::E_STOP) {
            b.andn_sym(sym::E_STOP)?;
        }
        b.line(IlOp::St, RUN_BIT, "SYSTEM_RUN");
        b.finish("System Start/Stop Control");

        // Fill commands
        for pump in PumpId::ALL {
            let tank = pump.tank().index();
            b.line(IlOp::Ld, RUN_BIT, "System running");
            match config.fill_mode {
                FillMode::LevelSwitch => b.and_sym(sym::TANK_LOW[tank])?,
                FillMode::Band => {
                    b.open_sym(IlOp::AndOpen, sym::TANK_LOW[tank])?;
                    b.line(IlOp::Or, &cmd_bit(pump), "Hold until high");
                    b.close();
                }
            }
            b.andn_sym(sym::TANK_HIGH[tank])?;
            b.line(IlOp::Andn, &fault_bit(pump), "No fault");
            if map.is_wired(sym::PUMP_OL[pump.index()]) {
                b.andn_sym(sym::PUMP_OL[pump.index()])?;
            }
            b.line(IlOp::St, &cmd_bit(pump), &format!("PUMP{}_CMD", pump.number()));
            b.finish(&format!(
                "Pump {} Command - Fill Tank {}",
                pump.number(),
                pump.tank().number()
            ));
        }

        // Startup timers
        for pump in PumpId::ALL {
            b.line(IlOp::Blk, &timer(pump), &format!("PUMP{}_START_DELAY", pump.number()));
            b.line(IlOp::Ld, &cmd_bit(pump), "Own command");
            if let Some(route) = pump.backs_up() {
                b.line(IlOp::Or, &backup_bit(route), "Backup duty");
            }
            b.bare(IlOp::In, "Timer input");
            b.bare(IlOp::EndBlk, "");
            b.finish(&format!("Pump {} Startup Delay", pump.number()));
        }

        // Zero-speed faults
        for pump in PumpId::ALL {
            let speed = sym::PUMP_SPEED_OK[pump.index()];
            b.line(IlOp::Ld, &format!("{}.Q", timer(pump)), "Start delay elapsed");
            b.andn_sym(speed)?;
            b.line(IlOp::Or, &fault_bit(pump), "Seal-in");
            b.open_sym(IlOp::AndnOpen, sym::FAULT_RESET)?;
            b.and_sym(speed)?;
            b.close();
            b.line(IlOp::St, &fault_bit(pump), &format!("PUMP{}_FAULT", pump.number()));
            b.finish(&format!("Pump {} Zero Speed Fault - Latching", pump.number()));
        }

        // Backup requests
        for route_id in RouteId::ALL {
            let route = route_id.route();
            let tank = route.tank().index();
            b.line(IlOp::Ld, &fault_bit(route.primary), "Primary faulted");
            b.and_sym(sym::TANK_LOW[tank])?;
            b.andn_sym(sym::TANK_HIGH[tank])?;
            b.line(IlOp::Andn, &fault_bit(route.backup), "Backup pump healthy");
            b.line(
                IlOp::St,
                &backup_bit(route_id),
                &format!("TANK{}_NEEDS_BACKUP", route.tank().number()),
            );
            b.finish(&format!(
                "Tank {} Backup - Pump {} takes over",
                route.tank().number(),
                route.backup.number()
            ));
        }

        // Pump outputs
        for pump in PumpId::ALL {
            b.line(IlOp::Ld, &cmd_bit(pump), "Own command");
            if let Some(route) = pump.backs_up() {
                b.line(IlOp::Or, &backup_bit(route), "Backup duty");
            }
            b.st_sym(sym::PUMP_RUN[pump.index()])?;
            b.finish(&format!("Pump {} Motor Output", pump.number()));
        }

        // Valves
        for route_id in RouteId::ALL {
            let valve = route_id.route().valve;
            b.line(IlOp::Ld, &backup_bit(route_id), "Backup active");
            b.st_sym(sym::VALVE[valve.index()])?;
            b.finish(&format!("Valve {} Opens in Backup", valve.label()));
        }

        // Indicators
        for pump in PumpId::ALL {
            b.line(IlOp::Ld, &fault_bit(pump), "Fault latched");
            b.st_sym(sym::PUMP_FAULT_IND[pump.index()])?;
            b.finish(&format!("Pump {} Fault Indicator", pump.number()));
        }
        b.line(IlOp::Ld, RUN_BIT, "System running");
        b.st_sym(sym::SYSTEM_RUN_IND)?;
        b.finish("System Running Indicator");

        for pump in PumpId::ALL {
            let op = if pump == PumpId::P1 { IlOp::Ld } else { IlOp::Or };
            b.line(op, &fault_bit(pump), &format!("PUMP{}_FAULT", pump.number()));
        }
        b.st_sym(sym::ALARM_OUTPUT)?;
        b.finish("Alarm - Any Fault");

        Ok(Self {
            project_name: config.project_name.as_str().to_owned(),
            variant: config.variant,
            fill_mode: config.fill_mode,
            scan_interval_ms: config.scan_interval_ms,
            map,
            memory: memory_bits(),
            timers: timer_defs(time_base, preset, topology.timer_preset_secs),
            rungs: b.rungs,
        })
    }

    /// Name of the main program unit.
    pub fn pou_name(&self) -> String {
        format!("{}_Main", self.project_name)
    }

    /// Look up a memory bit's symbol by address.
    pub fn memory_symbol(&self, address: &str) -> Option<&str> {
        self.memory
            .iter()
            .find(|m| m.address == address)
            .map(|m| m.symbol.as_str())
    }
}

fn memory_bits() -> Vec<MemoryBit> {
    let bit = |index: u16, symbol: String, comment: String| MemoryBit {
        address: format!("%M{index}"),
        index,
        symbol,
        comment,
    };
    let mut bits = vec![bit(0, "SYSTEM_RUN".into(), "System Running Flag".into())];
    for pump in PumpId::ALL {
        let n = pump.number();
        bits.push(bit(u16::from(n), format!("PUMP{n}_CMD"), format!("Pump {n} Command")));
    }
    for pump in PumpId::ALL {
        let n = pump.number();
        bits.push(bit(
            10 + pump.index() as u16,
            format!("PUMP{n}_FAULT"),
            format!("Pump {n} Fault (Latched)"),
        ));
    }
    for route in RouteId::ALL {
        let t = route.route().tank().number();
        bits.push(bit(
            20 + route.index() as u16,
            format!("TANK{t}_NEEDS_BACKUP"),
            format!("Tank {t} Backup Mode"),
        ));
    }
    bits
}

fn timer_defs(time_base: TimeBase, preset: u32, secs: f32) -> Vec<TimerDef> {
    PumpId::ALL
        .into_iter()
        .map(|pump| TimerDef {
            address: timer(pump),
            index: pump.index() as u16,
            symbol: format!("PUMP{}_START_DELAY", pump.number()),
            comment: format!("Pump {} Startup Delay - {secs} seconds before speed check", pump.number()),
            time_base,
            preset,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

struct Builder {
    map: IoMap,
    rungs: Vec<Rung>,
    current: Vec<IlLine>,
}

impl Builder {
    fn line(&mut self, op: IlOp, operand: &str, comment: &str) {
        self.current.push(IlLine {
            op,
            operand: Some(operand.to_owned()),
            comment: comment.to_owned(),
        });
    }

    fn bare(&mut self, op: IlOp, comment: &str) {
        self.current.push(IlLine {
            op,
            operand: None,
            comment: comment.to_owned(),
        });
    }

    fn sym_line(&mut self, op: IlOp, symbol: &str) -> Result<(), Error> {
        let address = self
            .map
            .address(symbol)
            .ok_or(Error::Render("rung references a terminal the controller does not wire"))?;
        self.line(op, address, symbol);
        Ok(())
    }

    fn ld_sym(&mut self, symbol: &str) -> Result<(), Error> {
        self.sym_line(IlOp::Ld, symbol)
    }

    fn and_sym(&mut self, symbol: &str) -> Result<(), Error> {
        self.sym_line(IlOp::And, symbol)
    }

    fn andn_sym(&mut self, symbol: &str) -> Result<(), Error> {
        self.sym_line(IlOp::Andn, symbol)
    }

    fn st_sym(&mut self, symbol: &str) -> Result<(), Error> {
        self.sym_line(IlOp::St, symbol)
    }

    fn open_sym(&mut self, op: IlOp, symbol: &str) -> Result<(), Error> {
        self.sym_line(op, symbol)
    }

    fn close(&mut self) {
        self.bare(IlOp::Close, "");
    }

    fn finish(&mut self, title: &str) {
        let lines = std::mem::take(&mut self.current);
        self.rungs.push(Rung {
            number: self.rungs.len() + 1,
            title: title.to_owned(),
            lines,
        });
    }
}
