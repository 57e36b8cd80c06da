// Roster positions and slot classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Baseball positions and roster slot types.
///
/// Concrete playing positions (C, 1B, ..., SP, RP) appear both as player
/// eligibility and as roster slots; flex slots (MI, CI, UTIL, P) and reserve
/// slots (Bench, IL, NA) only ever appear in a league's roster configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    Outfield,
    LeftField,
    CenterField,
    RightField,
    MiddleInfield,
    CornerInfield,
    Infield,
    DesignatedHitter,
    Utility,
    StartingPitcher,
    ReliefPitcher,
    Pitcher,
    Bench,
    InjuredList,
    Minors,
}

/// Positions that carry their own scarcity analysis.
pub const CONCRETE_POSITIONS: &[Position] = &[
    Position::Catcher,
    Position::FirstBase,
    Position::SecondBase,
    Position::ThirdBase,
    Position::ShortStop,
    Position::Outfield,
    Position::StartingPitcher,
    Position::ReliefPitcher,
];

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual fantasy abbreviations, case-insensitively:
    /// "BN"/"BE"/"BENCH" -> Bench, "IL"/"DL" -> InjuredList, "UT"/"UTIL" -> Utility.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "OF" => Some(Position::Outfield),
            "LF" => Some(Position::LeftField),
            "CF" => Some(Position::CenterField),
            "RF" => Some(Position::RightField),
            "MI" => Some(Position::MiddleInfield),
            "CI" => Some(Position::CornerInfield),
            "IF" => Some(Position::Infield),
            "DH" => Some(Position::DesignatedHitter),
            "UT" | "UTIL" => Some(Position::Utility),
            "SP" => Some(Position::StartingPitcher),
            "RP" => Some(Position::ReliefPitcher),
            "P" => Some(Position::Pitcher),
            "BN" | "BE" | "BENCH" => Some(Position::Bench),
            "IL" | "DL" => Some(Position::InjuredList),
            "NA" | "MINORS" => Some(Position::Minors),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::Outfield => "OF",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::MiddleInfield => "MI",
            Position::CornerInfield => "CI",
            Position::Infield => "IF",
            Position::DesignatedHitter => "DH",
            Position::Utility => "UTIL",
            Position::StartingPitcher => "SP",
            Position::ReliefPitcher => "RP",
            Position::Pitcher => "P",
            Position::Bench => "BN",
            Position::InjuredList => "IL",
            Position::Minors => "NA",
        }
    }

    /// Collapse the individual outfield spots into the generic outfield.
    pub fn canonical(self) -> Self {
        match self {
            Position::LeftField | Position::CenterField | Position::RightField => {
                Position::Outfield
            }
            other => other,
        }
    }

    /// Whether a roster slot of this type is filled by a hitter.
    pub fn is_hitter_slot(&self) -> bool {
        matches!(
            self,
            Position::Catcher
                | Position::FirstBase
                | Position::SecondBase
                | Position::ThirdBase
                | Position::ShortStop
                | Position::Outfield
                | Position::LeftField
                | Position::CenterField
                | Position::RightField
                | Position::MiddleInfield
                | Position::CornerInfield
                | Position::Infield
                | Position::DesignatedHitter
                | Position::Utility
        )
    }

    /// Whether a roster slot of this type is filled by a pitcher.
    pub fn is_pitcher_slot(&self) -> bool {
        matches!(
            self,
            Position::StartingPitcher | Position::ReliefPitcher | Position::Pitcher
        )
    }

    /// Reserve slots that never take part in the auction (IL and minors).
    pub fn is_excluded_slot(&self) -> bool {
        matches!(self, Position::InjuredList | Position::Minors)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

impl TryFrom<String> for Position {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Position::from_str_pos(&value).ok_or_else(|| format!("unknown position '{value}'"))
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.display_str().to_string()
    }
}

/// Parse a delimited eligibility string such as `"2B/SS"` or `"1B, OF"`.
///
/// Unknown tokens are skipped; duplicates after canonicalization are dropped
/// while preserving the listed order (the first entry is the primary position).
pub fn parse_positions(s: &str) -> Vec<Position> {
    let mut out = Vec::new();
    for token in s.split(['/', ',', ' ']) {
        if token.trim().is_empty() {
            continue;
        }
        if let Some(pos) = Position::from_str_pos(token) {
            let pos = pos.canonical();
            if !out.contains(&pos) {
                out.push(pos);
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
