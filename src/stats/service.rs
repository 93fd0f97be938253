use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    calculators::{TeamStatisticsCalculator, TrainingRecommendationGenerator},
    repository::StatsRepository,
    AthleteTrainingSummary, StatsError, TeamStatistics,
};

/// Fetches a subject's rows from the store and hands them to the calculators
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
    team_calculator: TeamStatisticsCalculator,
    recommendation_generator: TrainingRecommendationGenerator,
    recent_training_limit: usize,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>, recent_training_limit: usize) -> Self {
        Self {
            repository,
            team_calculator: TeamStatisticsCalculator::new(),
            recommendation_generator: TrainingRecommendationGenerator::new(),
            recent_training_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn team_statistics(&self, team_id: i64) -> Result<TeamStatistics, StatsError> {
        if !self.repository.team_exists(team_id).await? {
            warn!(team_id, "Statistics requested for unknown team");
            return Err(StatsError::TeamNotFound(team_id));
        }

        let rows = self.repository.rows_for_team(team_id).await?;
        let match_scores = self.repository.opposing_scores_for_team(team_id).await?;
        let roster_ages = self.repository.roster_for_team(team_id).await?;

        debug!(
            team_id,
            match_rows = rows.len(),
            opposing_rows = match_scores.len(),
            roster_size = roster_ages.len(),
            "Calculating team statistics"
        );

        let stats = self
            .team_calculator
            .calculate(team_id, &rows, &match_scores, &roster_ages);

        info!(
            team_id,
            win_percentage = stats.win_percentage,
            competitions = stats.competitions_participated,
            "Team statistics calculated"
        );
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn athlete_training_summary(
        &self,
        user_id: i64,
    ) -> Result<AthleteTrainingSummary, StatsError> {
        let age = match self.repository.athlete_age(user_id).await? {
            Some(age) => age,
            None => {
                warn!(user_id, "Recommendation requested for unknown user");
                return Err(StatsError::UserNotFound(user_id));
            }
        };

        let recent_trainings = self
            .repository
            .recent_trainings_for_user(user_id, self.recent_training_limit)
            .await?;
        let intensities: Vec<i32> = recent_trainings.iter().map(|t| t.intensity).collect();

        let report = self.recommendation_generator.generate(age, &intensities);

        info!(
            user_id,
            sessions = report.total,
            recommendation = ?report.recommendation,
            "Training recommendation generated"
        );

        Ok(AthleteTrainingSummary {
            user_id,
            age,
            recent_trainings,
            report,
        })
    }
}
