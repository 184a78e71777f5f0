//! Instruction text sent with a ladder sketch.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target PLC family.  Selects the addressing notes appended to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Schneider,
    Rockwell,
    Siemens,
    Mitsubishi,
    /// No platform notes.
    Generic,
}

impl Platform {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Schneider => "schneider",
            Self::Rockwell => "rockwell",
            Self::Siemens => "siemens",
            Self::Mitsubishi => "mitsubishi",
            Self::Generic => "generic",
        }
    }

    fn notes(self) -> &'static str {
        match self {
            Self::Schneider => SCHNEIDER_NOTES,
            Self::Rockwell => ROCKWELL_NOTES,
            Self::Siemens => SIEMENS_NOTES,
            Self::Mitsubishi => MITSUBISHI_NOTES,
            Self::Generic => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Platform {
    type Err = core::convert::Infallible;

    /// Unknown names select [`Platform::Generic`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "schneider" => Self::Schneider,
            "rockwell" => Self::Rockwell,
            "siemens" => Self::Siemens,
            "mitsubishi" => Self::Mitsubishi,
            _ => Self::Generic,
        })
    }
}

/// Symbol legend, extraction rules and the JSON shape, followed by the
/// platform notes and the closing rules.
pub fn build_prompt(platform: Platform) -> String {
    let mut p = String::with_capacity(
        SYMBOL_LEGEND.len() + JSON_TEMPLATE.len() + platform.notes().len() + CLOSING_RULES.len(),
    );
    p.push_str(SYMBOL_LEGEND);
    p.push_str(JSON_TEMPLATE);
    p.push_str(platform.notes());
    p.push_str(CLOSING_RULES);
    p
}

const SYMBOL_LEGEND: &str = r#"
Analyze this hand-drawn ladder logic diagram and extract ALL details with precision.

LADDER LOGIC SYMBOLS TO IDENTIFY:
1. Contacts (Inputs):
   - Normally Open (NO): —| |— (closed when energized)
   - Normally Closed (NC): —|/|— (open when energized)

2. Coils (Outputs):
   - Standard Coil: —( )—
   - Negated Coil: —(/)—
   - Set Coil: —(S)— (latches on)
   - Reset Coil: —(R)— (latches off)

3. Timers: TON (on-delay), TOF (off-delay), TP (pulse), RTO (retentive)

4. Counters: CTU (count up), CTD (count down), CTUD (up/down)

5. Comparison & Math: EQU, NEQ, GRT, LES, ADD, SUB, MUL, DIV

6. Function Blocks: PID, MOV, AND/OR/XOR

7. Special Elements: rising edge —[P]—, falling edge —[N]—, one-shot —[OSR]—

EXTRACTION REQUIREMENTS:
1. NUMBER all rungs sequentially (0, 1, 2, ...)
2. IDENTIFY all symbols on each rung left-to-right
3. EXTRACT labels/addresses (e.g., "START", "M0.0", "%I0.1")
4. CAPTURE preset values for timers/counters
5. NOTE connections between parallel branches
6. READ any handwritten comments or annotations
7. DETECT logic flow and dependencies

OUTPUT FORMAT (JSON):
"#;

const JSON_TEMPLATE: &str = r#"
{
  "analysis_metadata": {
    "total_rungs": 0,
    "total_contacts": 0,
    "total_coils": 0,
    "total_timers": 0,
    "total_counters": 0,
    "sketch_quality": "good|fair|poor",
    "ambiguities": []
  },
  "rungs": [
    {
      "rung_number": 0,
      "comment": "Description of what this rung does",
      "elements": [
        {
          "type": "contact_no|contact_nc|coil|coil_set|coil_reset|timer_ton|timer_tof|counter_ctu|etc",
          "label": "START_BTN|MOTOR|TIMER1|etc",
          "address": "%I0.0|%Q0.0|%TM0|M0.0|etc",
          "position": "left|middle|right",
          "branch": 0,
          "parameters": {
            "preset": "5000",
            "time_base": "ms|s",
            "data_type": "INT|DINT|REAL"
          }
        }
      ],
      "logic_description": "Clear English description of rung logic"
    }
  ],
  "tags_detected": [
    {
      "name": "START_BTN",
      "address": "%I0.0",
      "type": "INPUT|OUTPUT|MEMORY|TIMER|COUNTER",
      "data_type": "BOOL|INT|REAL",
      "comment": "Start push button"
    }
  ],
  "platform_notes": {
    "addressing_scheme": "IEC|Allen-Bradley|Schneider|Siemens",
    "special_instructions": []
  }
}
"#;

const SCHNEIDER_NOTES: &str = "
TARGET PLATFORM: Schneider Electric M221/M241
- Use IEC addressing: %I (inputs), %Q (outputs), %M (memory), %TM (timers)
- Timer format: TON (T#5s for 5 seconds)
- Counter preset values in decimal
";

const ROCKWELL_NOTES: &str = "
TARGET PLATFORM: Rockwell/Allen-Bradley CompactLogix
- Use tag-based addressing (no fixed I/O addresses)
- Timer format: TON with .PRE, .ACC, .DN members
- Tags like Local:1:I.Data[0], Local:2:O.Data[0]
";

const SIEMENS_NOTES: &str = "
TARGET PLATFORM: Siemens S7-1200/S7-1500
- Use symbolic addressing: I0.0 (inputs), Q0.0 (outputs), M0.0 (memory)
- Timer format: TON (TIME#5s for 5 seconds)
- DB blocks for data storage
";

const MITSUBISHI_NOTES: &str = "
TARGET PLATFORM: Mitsubishi FX/iQ-R Series
- Use device addressing: X (inputs), Y (outputs), M (memory), T (timers), C (counters)
- Timer format: T0 K50 (50 * time base)
- Counter format: C0 K100 (preset 100)
";

const CLOSING_RULES: &str = r#"

CRITICAL INSTRUCTIONS:
1. Be PRECISE - if you cannot clearly identify a symbol, mark it as "unclear" in ambiguities
2. Preserve ALL labels exactly as written (even if handwriting is messy)
3. Detect parallel branches (OR logic) vs series elements (AND logic)
4. Number rungs from top to bottom (0, 1, 2, ...)
5. Extract timer/counter preset values
6. Note any special conditions or edge triggers
7. Return ONLY valid JSON, no extra text

If the sketch quality is poor, still provide best-effort analysis and list all ambiguities.
"#;
