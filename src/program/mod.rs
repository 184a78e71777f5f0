//! Artifact generation: the same control logic as [`crate::policy`],
//! laid out as PLC rungs and written in three formats.
//!
//! | Artifact          | Module     | Consumer                        |
//! |-------------------|------------|---------------------------------|
//! | IL listing        | `il`       | copy/paste into the IL editor   |
//! | `.smbp` project   | `smbp`     | Machine Expert Basic            |
//! | Markdown document | `markdown` | commissioning / operators       |

pub mod il;
pub mod markdown;
pub mod rungs;
pub mod smbp;

use core::fmt;
use core::str::FromStr;

pub use rungs::{IlLine, IlOp, MemoryBit, Program, Rung, TimeBase, TimerDef};

use crate::config::{ControllerConfig, validate_config};
use crate::error::Error;
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    InstructionList,
    Smbp,
    Markdown,
}

impl ArtifactKind {
    /// Conventional file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::InstructionList => "il",
            Self::Smbp => "smbp",
            Self::Markdown => "md",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InstructionList => "il",
            Self::Smbp => "smbp",
            Self::Markdown => "markdown",
        })
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "il" | "instruction-list" => Ok(Self::InstructionList),
            "smbp" | "project" => Ok(Self::Smbp),
            "md" | "markdown" | "doc" => Ok(Self::Markdown),
            _ => Err(Error::Render("unknown artifact kind")),
        }
    }
}

/// Validate the configuration, lay out the rungs and render one artifact.
pub fn render(kind: ArtifactKind, topology: &Topology, config: &ControllerConfig) -> Result<String, Error> {
    validate_config(config)?;
    let program = Program::build(topology, config)?;
    log::debug!(
        "render {kind}: {} rungs for {}",
        program.rungs.len(),
        program.variant.model()
    );
    Ok(match kind {
        ArtifactKind::InstructionList => il::render(&program),
        ArtifactKind::Smbp => smbp::render(&program),
        ArtifactKind::Markdown => markdown::render(&program),
    })
}
