// Team budgets during a live auction.

use crate::inflation::types::{LeagueConfig, MatchedPlayer, ScrapedTeam, TeamBudgetConstraint};
use std::collections::BTreeMap;

/// Remaining budget less the mandatory $1 for every slot after the next one.
pub fn effective_budget(budget_remaining: u32, slots_remaining: u32) -> u32 {
    budget_remaining.saturating_sub(slots_remaining.saturating_sub(1))
}

fn constraint(
    team_name: String,
    spent: u32,
    budget_remaining: u32,
    players_drafted: u32,
    total_slots: u32,
    budget_per_team: u32,
) -> TeamBudgetConstraint {
    let roster_spots_remaining = total_slots.saturating_sub(players_drafted);
    TeamBudgetConstraint {
        team_name,
        spent,
        budget_remaining,
        players_drafted,
        roster_spots_remaining,
        effective_budget: effective_budget(budget_remaining, roster_spots_remaining),
        average_per_player: if players_drafted > 0 {
            f64::from(spent) / f64::from(players_drafted)
        } else {
            0.0
        },
        budget_utilization: if budget_per_team > 0 {
            f64::from(spent) / f64::from(budget_per_team) * 100.0
        } else {
            0.0
        },
    }
}

/// Constraints from scraped draft-room budgets.
///
/// A team without a roster size uses the league's; a team without a spent
/// total is assumed to have started from the league budget.
pub fn constraints_from_teams(
    teams: &[ScrapedTeam],
    config: &LeagueConfig,
) -> Vec<TeamBudgetConstraint> {
    let league_slots = config.roster_size() as u32;
    teams
        .iter()
        .map(|t| {
            constraint(
                t.name.clone(),
                t.spent
                    .unwrap_or_else(|| config.budget_per_team.saturating_sub(t.budget_remaining)),
                t.budget_remaining,
                t.players_drafted,
                t.total_roster_spots.unwrap_or(league_slots),
                config.budget_per_team,
            )
        })
        .collect()
}

/// Constraints rebuilt from winning bids when no team data was scraped.
///
/// Only teams that have won at least one player appear.
pub fn constraints_from_bids(
    players: &[MatchedPlayer],
    config: &LeagueConfig,
) -> Vec<TeamBudgetConstraint> {
    let mut by_team: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for p in players.iter().filter(|p| p.is_drafted()) {
        if let (Some(team), Some(bid)) = (p.winning_team.as_deref(), p.actual_bid) {
            let entry = by_team.entry(team).or_insert((0, 0));
            entry.0 += bid;
            entry.1 += 1;
        }
    }
    let league_slots = config.roster_size() as u32;
    by_team
        .into_iter()
        .map(|(team, (spent, drafted))| {
            constraint(
                team.to_string(),
                spent,
                config.budget_per_team.saturating_sub(spent),
                drafted,
                league_slots,
                config.budget_per_team,
            )
        })
        .collect()
}

/// Money left to chase value, league-wide.
///
/// With scraped teams this is the sum of their effective budgets. Without
/// them: `max(0, remaining − max(0, remaining slots − teams))`, i.e. every
/// open slot is held at $1 except one per team.
pub fn adjusted_remaining_budget(
    players: &[MatchedPlayer],
    config: &LeagueConfig,
    scraped: Option<&[TeamBudgetConstraint]>,
) -> f64 {
    if let Some(constraints) = scraped {
        return constraints
            .iter()
            .map(|c| f64::from(c.effective_budget))
            .sum();
    }
    let drafted: Vec<&MatchedPlayer> = players.iter().filter(|p| p.is_drafted()).collect();
    let spent: u32 = drafted.iter().filter_map(|p| p.actual_bid).sum();
    let remaining = i64::from(config.total_budget()) - i64::from(spent);
    let total_slots = i64::from(config.num_teams) * config.roster_size() as i64;
    let remaining_slots = (total_slots - drafted.len() as i64).max(0);
    let reserve = (remaining_slots - i64::from(config.num_teams)).max(0);
    (remaining - reserve).max(0) as f64
}

/// How contested a bid at `price` would be, in [0, 1].
///
/// Each team whose effective budget covers the price counts with weight
/// `max(0.1, 1 − 0.5 × price / effective budget)`; the sum is divided by the
/// number of teams supplied. Returns 0.25 when nobody can afford the price
/// and 1.0 when there is no budget information at all.
pub fn competition_factor(price: u32, constraints: &[TeamBudgetConstraint]) -> f64 {
    if constraints.is_empty() {
        return 1.0;
    }
    let weighted: f64 = constraints
        .iter()
        .filter(|c| c.effective_budget > 0 && c.effective_budget >= price)
        .map(|c| (1.0 - 0.5 * f64::from(price) / f64::from(c.effective_budget)).max(0.1))
        .sum();
    if weighted == 0.0 {
        return 0.25;
    }
    (weighted / constraints.len() as f64).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflation::types::AuctionStatus;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn league() -> LeagueConfig {
        LeagueConfig {
            num_teams: 2,
            budget_per_team: 100,
            roster_spots: [("C", 1), ("OF", 3), ("SP", 2), ("BN", 1), ("IL", 1)]
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    fn bought(team: &str, bid: u32) -> MatchedPlayer {
        MatchedPlayer {
            name: format!("{team}-{bid}"),
            positions: vec!["OF".into()],
            status: AuctionStatus::Drafted,
            winning_team: Some(team.into()),
            actual_bid: Some(bid),
            projected_value: Some(f64::from(bid)),
        }
    }

    fn team(name: &str, remaining: u32, drafted: u32) -> ScrapedTeam {
        ScrapedTeam {
            name: name.into(),
            budget_remaining: remaining,
            players_drafted: drafted,
            total_roster_spots: None,
            spent: None,
        }
    }

    #[test]
    fn effective_budget_reserves_future_slots() {
        assert_eq!(effective_budget(50, 5), 46);
        assert_eq!(effective_budget(50, 1), 50);
        assert_eq!(effective_budget(50, 0), 50);
        assert_eq!(effective_budget(3, 10), 0);
    }

    #[test]
    fn scraped_team_constraints() {
        let c = constraints_from_teams(&[team("Duke", 40, 3)], &league());
        let duke = &c[0];
        // roster size 7 (IL excluded) -> 4 left, $3 held back
        assert_eq!(duke.roster_spots_remaining, 4);
        assert_eq!(duke.effective_budget, 37);
        assert_eq!(duke.spent, 60);
        assert!(approx_eq(duke.average_per_player, 20.0, 1e-12));
        assert!(approx_eq(duke.budget_utilization, 60.0, 1e-12));
    }

    #[test]
    fn constraints_rebuilt_from_bids() {
        let players = vec![bought("B", 30), bought("A", 10), bought("B", 5)];
        let c = constraints_from_bids(&players, &league());
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].team_name, "A");
        assert_eq!(c[1].team_name, "B");
        assert_eq!(c[1].spent, 35);
        assert_eq!(c[1].players_drafted, 2);
        assert_eq!(c[1].budget_remaining, 65);
        assert_eq!(c[1].effective_budget, 61);
    }

    #[test]
    fn adjusted_budget_without_teams() {
        // 200 total, 45 spent; 14 slots, 3 filled -> 11 open, 9 held back
        let players = vec![bought("B", 30), bought("A", 10), bought("B", 5)];
        let budget = adjusted_remaining_budget(&players, &league(), None);
        assert!(approx_eq(budget, 146.0, 1e-12));
        assert!(approx_eq(
            adjusted_remaining_budget(&[], &league(), None),
            200.0 - 12.0,
            1e-12
        ));
    }

    #[test]
    fn adjusted_budget_with_teams_sums_effective() {
        let c = constraints_from_teams(&[team("A", 40, 3), team("B", 10, 6)], &league());
        assert!(approx_eq(adjusted_remaining_budget(&[], &league(), Some(&c)), 47.0, 1e-12));
    }

    #[test]
    fn competition_weights_and_floor() {
        let c = constraints_from_teams(&[team("A", 40, 6), team("B", 10, 6)], &league());
        // Only A (effective 40) covers $20: weight 1 − 0.5 × 0.5 = 0.75, over 2 teams
        assert!(approx_eq(competition_factor(20, &c), 0.375, 1e-12));
        // Both cover $4
        let expected = ((1.0 - 0.5 * 4.0 / 40.0) + (1.0 - 0.5 * 4.0 / 10.0)) / 2.0;
        assert!(approx_eq(competition_factor(4, &c), expected, 1e-12));
        // Nobody covers $41
        assert!(approx_eq(competition_factor(41, &c), 0.25, 1e-12));
        assert!(approx_eq(competition_factor(5, &[]), 1.0, 1e-12));
    }

    #[test]
    fn competition_normalizes_by_teams_supplied() {
        // Twelve-team league, but only two teams were scraped.
        let mut config = league();
        config.num_teams = 12;
        let c = constraints_from_teams(&[team("A", 40, 6), team("B", 40, 6)], &config);
        let expected = 1.0 - 0.5 * 10.0 / 40.0;
        assert!(approx_eq(competition_factor(10, &c), expected, 1e-12));
    }
}
