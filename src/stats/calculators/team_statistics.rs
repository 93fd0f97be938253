use std::collections::{BTreeSet, HashMap};

use super::super::{MatchScoreRow, TeamScoreRow, TeamStatistics};

/// Turns a team's match rows and roster into its [`TeamStatistics`].
///
/// Empty inputs are not errors: competition and averages come back as `None`,
/// counts and the win percentage as zero.
pub struct TeamStatisticsCalculator;

impl Default for TeamStatisticsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamStatisticsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// `rows` are the team's own scores, `match_scores` any scores from the
    /// matches it played (rows of the team itself are ignored), and
    /// `roster_ages` the ages of the team's current members.
    pub fn calculate(
        &self,
        team_id: i64,
        rows: &[TeamScoreRow],
        match_scores: &[MatchScoreRow],
        roster_ages: &[i32],
    ) -> TeamStatistics {
        let best = most_successful_competition(rows);

        TeamStatistics {
            team_id,
            competitions_participated: competitions_participated(rows),
            most_successful_competition_id: best.as_ref().map(|(id, _, _)| *id),
            most_successful_competition: best.as_ref().map(|(_, name, _)| name.clone()),
            most_successful_competition_score: best.map_or(0, |(_, _, total)| total),
            average_age: mean(roster_ages.iter().map(|age| i64::from(*age))),
            win_percentage: win_percentage(team_id, rows, match_scores),
            average_score: mean(rows.iter().map(|row| i64::from(row.team_score))),
        }
    }
}

fn competitions_participated(rows: &[TeamScoreRow]) -> u32 {
    let distinct: BTreeSet<i64> = rows.iter().map(|row| row.competition_id).collect();
    distinct.len() as u32
}

/// Highest summed score per competition. Ties go to the competition name
/// that sorts first, then to the lower competition id.
fn most_successful_competition(rows: &[TeamScoreRow]) -> Option<(i64, String, i64)> {
    let mut totals: HashMap<i64, (&str, i64)> = HashMap::new();
    for row in rows {
        let entry = totals
            .entry(row.competition_id)
            .or_insert((row.competition_name.as_str(), 0));
        entry.1 += i64::from(row.team_score);
    }

    totals
        .into_iter()
        .min_by(|(a_id, (a_name, a_total)), (b_id, (b_name, b_total))| {
            b_total
                .cmp(a_total)
                .then_with(|| a_name.cmp(b_name))
                .then_with(|| a_id.cmp(b_id))
        })
        .map(|(id, (name, total))| (id, name.to_string(), total))
}

/// A row is won when another team in the same match scored strictly less.
fn win_percentage(team_id: i64, rows: &[TeamScoreRow], match_scores: &[MatchScoreRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }

    let mut opponents: HashMap<i64, Vec<i32>> = HashMap::new();
    for score in match_scores.iter().filter(|s| s.team_id != team_id) {
        opponents
            .entry(score.match_id)
            .or_default()
            .push(score.team_score);
    }

    let won = rows
        .iter()
        .filter(|row| {
            opponents
                .get(&row.match_id)
                .is_some_and(|scores| scores.iter().any(|s| *s < row.team_score))
        })
        .count();

    won as f64 / rows.len() as f64 * 100.0
}

fn mean(values: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / f64::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM: i64 = 1;

    fn row(match_id: i64, competition_id: i64, name: &str, team_score: i32) -> TeamScoreRow {
        TeamScoreRow {
            match_id,
            competition_id,
            competition_name: name.to_string(),
            team_score,
        }
    }

    fn score(match_id: i64, team_id: i64, team_score: i32) -> MatchScoreRow {
        MatchScoreRow {
            match_id,
            team_id,
            team_score,
        }
    }

    #[test]
    fn empty_team_yields_defaults() {
        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &[], &[], &[]);

        assert_eq!(stats.team_id, TEAM);
        assert_eq!(stats.competitions_participated, 0);
        assert_eq!(stats.most_successful_competition, None);
        assert_eq!(stats.most_successful_competition_id, None);
        assert_eq!(stats.most_successful_competition_score, 0);
        assert_eq!(stats.average_age, None);
        assert_eq!(stats.win_percentage, 0.0);
        assert_eq!(stats.average_score, None);
    }

    #[test]
    fn picks_competition_with_highest_total() {
        let rows = vec![
            row(1, 10, "A", 10),
            row(2, 20, "B", 5),
            row(3, 20, "B", 7),
        ];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &[], &[]);

        assert_eq!(stats.competitions_participated, 2);
        assert_eq!(stats.most_successful_competition.as_deref(), Some("B"));
        assert_eq!(stats.most_successful_competition_id, Some(20));
        assert_eq!(stats.most_successful_competition_score, 12);
    }

    #[test]
    fn ties_resolve_by_competition_name() {
        let rows = vec![row(1, 30, "Zonal Cup", 8), row(2, 40, "Autumn Cup", 8)];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &[], &[]);

        assert_eq!(
            stats.most_successful_competition.as_deref(),
            Some("Autumn Cup")
        );
    }

    #[test]
    fn ties_with_same_name_resolve_by_competition_id() {
        let rows = vec![row(1, 9, "League", 4), row(2, 3, "League", 4)];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &[], &[]);

        assert_eq!(stats.most_successful_competition_id, Some(3));
        assert_eq!(stats.most_successful_competition_score, 4);
    }

    #[test]
    fn averages_roster_ages_and_scores() {
        let rows = vec![row(1, 10, "A", 3), row(2, 10, "A", 4)];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &[], &[20, 25, 33]);

        assert_eq!(stats.average_age, Some(26.0));
        assert_eq!(stats.average_score, Some(3.5));
    }

    #[test]
    fn counts_wins_against_lower_opponent() {
        let rows = vec![
            row(1, 10, "A", 3),
            row(2, 10, "A", 1),
            row(3, 10, "A", 2),
            row(4, 10, "A", 0),
        ];
        let scores = vec![
            score(1, TEAM, 3),
            score(1, 2, 1),
            score(2, 2, 4),
            score(3, 3, 2),
        ];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &scores, &[]);

        // won match 1, lost match 2, drew match 3, no opponent in match 4
        assert_eq!(stats.win_percentage, 25.0);
    }

    #[test]
    fn wins_are_scoped_to_the_same_match() {
        // team 1 scored 10 in match 1, team 2 scored 20 and 5 in match 2
        let rows = vec![row(1, 10, "A", 10)];
        let scores = vec![score(2, 2, 20), score(2, 2, 5)];

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &scores, &[]);

        assert_eq!(stats.win_percentage, 0.0);
    }

    #[test]
    fn win_percentage_stays_within_bounds() {
        let rows: Vec<TeamScoreRow> = (1..=5).map(|m| row(m, 10, "A", 9)).collect();
        let scores: Vec<MatchScoreRow> = (1..=5)
            .flat_map(|m| vec![score(m, 2, 1), score(m, 3, 0)])
            .collect();

        let stats = TeamStatisticsCalculator::new().calculate(TEAM, &rows, &scores, &[]);

        assert_eq!(stats.win_percentage, 100.0);
    }
}
