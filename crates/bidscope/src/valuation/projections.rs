// Projection data model and CSV loading.
//
// Hitter and pitcher projections arrive as separate CSV exports (one row per
// player). Dynasty rankings arrive as a third CSV with an overall rank and
// minor/major league level.

use crate::position::{parse_positions, Position};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Whether a projection describes a hitter or a pitcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Hitter,
    Pitcher,
}

/// Projected season stats for a hitter.
///
/// Stats a projection system does not publish are left at 0 and estimated on
/// demand by the stat extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HittingStats {
    pub g: f64,
    pub pa: f64,
    pub ab: f64,
    pub h: f64,
    pub singles: f64,
    pub doubles: f64,
    pub triples: f64,
    pub hr: f64,
    pub r: f64,
    pub rbi: f64,
    pub bb: f64,
    #[serde(alias = "so")]
    pub k: f64,
    pub sb: f64,
    pub cs: f64,
    pub hbp: f64,
    pub sf: f64,
    pub gidp: f64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub war: f64,
}

/// Projected season stats for a pitcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PitchingStats {
    pub g: f64,
    pub gs: f64,
    pub ip: f64,
    pub w: f64,
    pub l: f64,
    pub sv: f64,
    #[serde(alias = "hd")]
    pub hld: f64,
    #[serde(alias = "so")]
    pub k: f64,
    pub h: f64,
    pub bb: f64,
    pub hr: f64,
    pub er: f64,
    pub era: f64,
    pub whip: f64,
    pub fip: f64,
    pub qs: f64,
    pub war: f64,
}

impl PitchingStats {
    /// A pitcher who starts at least half of his appearances.
    pub fn is_starter(&self) -> bool {
        self.gs > 0.0 && self.gs >= self.g / 2.0
    }
}

/// One player's projection from a single projection system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    pub player_type: PlayerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hitting: Option<HittingStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitching: Option<PitchingStats>,
}

impl Projection {
    /// Projected wins above replacement from whichever stat block applies.
    pub fn war(&self) -> f64 {
        match self.player_type {
            PlayerType::Hitter => self.hitting.as_ref().map_or(0.0, |h| h.war),
            PlayerType::Pitcher => self.pitching.as_ref().map_or(0.0, |p| p.war),
        }
    }
}

/// A long-term (dynasty) ranking from an external crowd-sourced list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynastyRanking {
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
    pub overall_rank: u32,
    /// Organization level, e.g. "MLB", "AAA", "A+".
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub dynasty_value: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Hitter CSV row. Optional columns accept blanks; unknown columns are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawHitter {
    #[serde(default, alias = "PlayerId", alias = "playerid")]
    ID: String,
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default, alias = "Pos")]
    POS: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    G: Option<f64>,
    PA: f64,
    AB: f64,
    H: f64,
    #[serde(default, rename = "1B", deserialize_with = "csv::invalid_option")]
    Singles: Option<f64>,
    #[serde(default, rename = "2B", deserialize_with = "csv::invalid_option")]
    Doubles: Option<f64>,
    #[serde(default, rename = "3B", deserialize_with = "csv::invalid_option")]
    Triples: Option<f64>,
    HR: f64,
    R: f64,
    RBI: f64,
    BB: f64,
    #[serde(default, alias = "K", deserialize_with = "csv::invalid_option")]
    SO: Option<f64>,
    SB: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    CS: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HBP: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SF: Option<f64>,
    #[serde(default, alias = "GDP", deserialize_with = "csv::invalid_option")]
    GIDP: Option<f64>,
    #[serde(alias = "BA")]
    AVG: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    OBP: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SLG: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    OPS: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    WAR: Option<f64>,
}

/// Pitcher CSV row (starters and relievers combined).
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPitcher {
    #[serde(default, alias = "PlayerId", alias = "playerid")]
    ID: String,
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default, alias = "Pos")]
    POS: String,
    G: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    GS: Option<f64>,
    IP: f64,
    W: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    L: Option<f64>,
    SV: f64,
    #[serde(default, alias = "HD", deserialize_with = "csv::invalid_option")]
    HLD: Option<f64>,
    #[serde(alias = "SO")]
    K: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    H: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ER: Option<f64>,
    ERA: f64,
    WHIP: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    FIP: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    QS: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    WAR: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawDynastyRanking {
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(default, alias = "POS")]
    Pos: String,
    Rank: u32,
    #[serde(default)]
    Level: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    Value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns true if all given f64 values are finite (not NaN or Infinity).
fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// External id for rows that don't carry one: a stable slug of name + team.
fn fallback_id(name: &str, team: &str) -> String {
    let slug: String = format!("{name}-{team}")
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.trim_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_hitters_from_reader<R: Read>(rdr: R) -> Result<Vec<Projection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut hitters = Vec::new();
    for result in reader.deserialize::<RawHitter>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim().to_string();
                if !all_finite(&[raw.PA, raw.AB, raw.H, raw.HR, raw.AVG]) {
                    warn!("skipping hitter '{}': non-finite projection value", name);
                    continue;
                }
                let team = raw.Team.trim().to_string();
                let external_id = if raw.ID.trim().is_empty() {
                    fallback_id(&name, &team)
                } else {
                    raw.ID.trim().to_string()
                };
                let obp = raw.OBP.unwrap_or(0.0);
                let slg = raw.SLG.unwrap_or(0.0);
                hitters.push(Projection {
                    external_id,
                    name,
                    team,
                    positions: parse_positions(&raw.POS),
                    player_type: PlayerType::Hitter,
                    hitting: Some(HittingStats {
                        g: raw.G.unwrap_or(0.0),
                        pa: raw.PA,
                        ab: raw.AB,
                        h: raw.H,
                        singles: raw.Singles.unwrap_or(0.0),
                        doubles: raw.Doubles.unwrap_or(0.0),
                        triples: raw.Triples.unwrap_or(0.0),
                        hr: raw.HR,
                        r: raw.R,
                        rbi: raw.RBI,
                        bb: raw.BB,
                        k: raw.SO.unwrap_or(0.0),
                        sb: raw.SB,
                        cs: raw.CS.unwrap_or(0.0),
                        hbp: raw.HBP.unwrap_or(0.0),
                        sf: raw.SF.unwrap_or(0.0),
                        gidp: raw.GIDP.unwrap_or(0.0),
                        avg: raw.AVG,
                        obp,
                        slg,
                        ops: raw.OPS.unwrap_or(obp + slg),
                        war: raw.WAR.unwrap_or(0.0),
                    }),
                    pitching: None,
                });
            }
            Err(e) => {
                warn!("skipping malformed hitter row: {}", e);
            }
        }
    }
    Ok(hitters)
}

fn load_pitchers_from_reader<R: Read>(rdr: R) -> Result<Vec<Projection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pitchers = Vec::new();
    for result in reader.deserialize::<RawPitcher>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim().to_string();
                if !all_finite(&[raw.IP, raw.ERA, raw.WHIP]) {
                    warn!("skipping pitcher '{}': non-finite IP/ERA/WHIP value", name);
                    continue;
                }
                let stats = PitchingStats {
                    g: raw.G,
                    gs: raw.GS.unwrap_or(0.0),
                    ip: raw.IP,
                    w: raw.W,
                    l: raw.L.unwrap_or(0.0),
                    sv: raw.SV,
                    hld: raw.HLD.unwrap_or(0.0),
                    k: raw.K,
                    h: raw.H.unwrap_or(0.0),
                    bb: raw.BB.unwrap_or(0.0),
                    hr: raw.HR.unwrap_or(0.0),
                    er: raw.ER.unwrap_or(0.0),
                    era: raw.ERA,
                    whip: raw.WHIP,
                    fip: raw.FIP.unwrap_or(0.0),
                    qs: raw.QS.unwrap_or(0.0),
                    war: raw.WAR.unwrap_or(0.0),
                };
                // Without an eligibility column, starter/reliever comes from GS share.
                let mut positions = parse_positions(&raw.POS);
                if positions.is_empty() {
                    positions.push(if stats.is_starter() {
                        Position::StartingPitcher
                    } else {
                        Position::ReliefPitcher
                    });
                }
                let team = raw.Team.trim().to_string();
                let external_id = if raw.ID.trim().is_empty() {
                    fallback_id(&name, &team)
                } else {
                    raw.ID.trim().to_string()
                };
                pitchers.push(Projection {
                    external_id,
                    name,
                    team,
                    positions,
                    player_type: PlayerType::Pitcher,
                    hitting: None,
                    pitching: Some(stats),
                });
            }
            Err(e) => {
                warn!("skipping malformed pitcher row: {}", e);
            }
        }
    }
    Ok(pitchers)
}

fn load_dynasty_from_reader<R: Read>(rdr: R) -> Result<Vec<DynastyRanking>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rankings = Vec::new();
    for result in reader.deserialize::<RawDynastyRanking>() {
        match result {
            Ok(raw) => {
                if raw.Rank == 0 {
                    warn!("skipping dynasty ranking for '{}': rank must be >= 1", raw.Name.trim());
                    continue;
                }
                rankings.push(DynastyRanking {
                    name: raw.Name.trim().to_string(),
                    team: raw.Team.trim().to_string(),
                    position: raw.Pos.trim().to_string(),
                    overall_rank: raw.Rank,
                    level: raw.Level.trim().to_string(),
                    dynasty_value: raw.Value.filter(|v| v.is_finite()).unwrap_or(0.0),
                });
            }
            Err(e) => {
                warn!("skipping malformed dynasty ranking row: {}", e);
            }
        }
    }
    Ok(rankings)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ProjectionError> {
    std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load hitter projections from a CSV file.
pub fn load_hitter_projections(path: &Path) -> Result<Vec<Projection>, ProjectionError> {
    load_hitters_from_reader(open(path)?).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load pitcher projections from a combined CSV file (SP+RP).
pub fn load_pitcher_projections(path: &Path) -> Result<Vec<Projection>, ProjectionError> {
    load_pitchers_from_reader(open(path)?).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load dynasty rankings from a CSV file.
pub fn load_dynasty_rankings(path: &Path) -> Result<Vec<DynastyRanking>, ProjectionError> {
    load_dynasty_from_reader(open(path)?).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load hitters and pitchers and return them as one list (hitters first).
pub fn load_all_projections(
    hitters_path: &Path,
    pitchers_path: &Path,
) -> Result<Vec<Projection>, ProjectionError> {
    let mut all = load_hitter_projections(hitters_path)?;
    let pitchers = load_pitcher_projections(pitchers_path)?;

    if all.is_empty() {
        return Err(ProjectionError::Validation(
            "hitter CSV produced zero valid rows".into(),
        ));
    }
    if pitchers.is_empty() {
        return Err(ProjectionError::Validation(
            "pitcher CSV produced zero valid rows".into(),
        ));
    }

    all.extend(pitchers);
    Ok(all)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hitter_csv_basic_fields() {
        let csv_data = "\
Name,Team,POS,PA,AB,H,2B,3B,HR,R,RBI,BB,SO,SB,CS,AVG,OBP,SLG,WAR
Aaron Judge,NYY,OF,700,600,180,30,1,50,120,130,90,170,5,1,0.300,0.420,0.650,8.5
Mookie Betts,LAD,2B/SS/OF,680,590,170,38,3,30,110,95,80,90,15,,0.288,0.380,0.520,6.1";

        let hitters = load_hitters_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(hitters.len(), 2);

        let judge = &hitters[0];
        assert_eq!(judge.name, "Aaron Judge");
        assert_eq!(judge.player_type, PlayerType::Hitter);
        assert_eq!(judge.positions, vec![Position::Outfield]);
        assert_eq!(judge.external_id, "aaron-judge-nyy");
        let stats = judge.hitting.as_ref().unwrap();
        assert_eq!(stats.hr, 50.0);
        assert_eq!(stats.doubles, 30.0);
        assert_eq!(stats.k, 170.0);
        assert!((stats.ops - 1.070).abs() < 1e-9);
        assert!((judge.war() - 8.5).abs() < 1e-9);

        let betts = &hitters[1];
        assert_eq!(betts.positions.len(), 3);
        assert_eq!(betts.hitting.as_ref().unwrap().cs, 0.0);
    }

    #[test]
    fn hitter_csv_k_alias_and_extra_columns() {
        let csv_data = "\
Name,Team,PA,AB,H,HR,R,RBI,BB,K,SB,BA,ADP
Juan Soto,NYM,690,560,160,38,115,105,125,120,8,0.285,12.0";

        let hitters = load_hitters_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(hitters.len(), 1);
        let stats = hitters[0].hitting.as_ref().unwrap();
        assert_eq!(stats.k, 120.0);
        assert!((stats.avg - 0.285).abs() < 1e-9);
        assert!(hitters[0].positions.is_empty());
    }

    #[test]
    fn malformed_hitter_rows_skipped() {
        let csv_data = "\
Name,Team,PA,AB,H,HR,R,RBI,BB,SB,AVG
Good Player,NYY,600,550,150,25,80,85,50,10,0.273
Bad Player,NYY,abc,550,150,25,80,85,50,10,0.273
Nan Player,NYY,600,550,150,25,80,85,50,10,NaN";

        let hitters = load_hitters_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(hitters.len(), 1);
        assert_eq!(hitters[0].name, "Good Player");
    }

    #[test]
    fn pitcher_csv_derives_role_from_starts() {
        let csv_data = "\
Name,Team,G,GS,IP,W,SV,HLD,ERA,WHIP,SO
Gerrit Cole,NYY,32,32,200,15,0,0,3.10,1.05,230
Emmanuel Clase,CLE,70,0,70,4,40,0,2.10,0.95,70";

        let pitchers = load_pitchers_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(pitchers.len(), 2);
        assert_eq!(pitchers[0].positions, vec![Position::StartingPitcher]);
        assert_eq!(pitchers[1].positions, vec![Position::ReliefPitcher]);
        assert_eq!(pitchers[0].pitching.as_ref().unwrap().k, 230.0);
        assert_eq!(pitchers[1].player_type, PlayerType::Pitcher);
    }

    #[test]
    fn pitcher_pos_column_wins_and_hd_alias() {
        let csv_data = "\
Name,Team,POS,G,GS,IP,W,SV,HD,ERA,WHIP,K
Swingman,SEA,SP/RP,40,10,100,6,1,8,3.80,1.20,95";

        let pitchers = load_pitchers_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(
            pitchers[0].positions,
            vec![Position::StartingPitcher, Position::ReliefPitcher]
        );
        assert_eq!(pitchers[0].pitching.as_ref().unwrap().hld, 8.0);
    }

    #[test]
    fn pitcher_inf_era_skipped() {
        let csv_data = "\
Name,Team,G,GS,IP,W,SV,ERA,WHIP,SO
Broken,XXX,10,0,0,0,0,inf,1.0,5";

        let pitchers = load_pitchers_from_reader(csv_data.as_bytes()).unwrap();
        assert!(pitchers.is_empty());
    }

    #[test]
    fn dynasty_rankings_loading() {
        let csv_data = "\
Name,Team,Pos,Rank,Level,Value
Bobby Witt Jr.,KC,SS,1,MLB,98.5
Prospect Guy,SEA,OF,40,AA,
Zero Rank,SEA,OF,0,MLB,10";

        let rankings = load_dynasty_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].overall_rank, 1);
        assert_eq!(rankings[0].level, "MLB");
        assert_eq!(rankings[1].dynasty_value, 0.0);
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let csv_data = "Name,Team,PA,AB,H,HR,R,RBI,BB,SB,AVG\n";
        assert!(load_hitters_from_reader(csv_data.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn projection_json_uses_camel_case() {
        let json = r#"{
            "externalId": "123",
            "name": "Test Hitter",
            "positions": ["1B"],
            "playerType": "hitter",
            "hitting": { "pa": 600, "hr": 30, "so": 140 }
        }"#;
        let p: Projection = serde_json::from_str(json).unwrap();
        assert_eq!(p.player_type, PlayerType::Hitter);
        let h = p.hitting.unwrap();
        assert_eq!(h.hr, 30.0);
        assert_eq!(h.k, 140.0);
        assert_eq!(h.r, 0.0);
    }
}
