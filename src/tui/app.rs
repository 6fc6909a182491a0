use crate::{
    config::Settings,
    models::{Comparison, ProjectConfig, RewardEstimate, UserOverview},
    scoring::{comparison, ScoreCalculator},
    session::{RequestSlot, ViewState},
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    EditingHandle,
    EditingFren,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Main,
    Results,
}

pub struct App {
    pub input_mode: InputMode,
    pub current_screen: Screen,
    pub handle_input: String,
    pub fren_input: String,
    pub projects: Vec<ProjectConfig>,
    pub selected_project: usize,
    pub fdv: f64,
    pub fdv_step: f64,
    pub max_fdv: f64,
    pub estimate: RequestSlot<RewardEstimate>,
    pub overview: RequestSlot<UserOverview>,
    pub comparison: RequestSlot<Comparison>,
    pub error_message: Option<String>,
    pub should_quit: bool,
    calculator: Arc<ScoreCalculator>,
}

impl App {
    pub fn new(settings: &Settings, calculator: Arc<ScoreCalculator>) -> Self {
        Self {
            input_mode: InputMode::Normal,
            current_screen: Screen::Main,
            handle_input: String::new(),
            fren_input: String::new(),
            projects: calculator.registry().all().to_vec(),
            selected_project: 0,
            fdv: settings.simulation.default_fdv.clamp(0.0, settings.simulation.max_fdv),
            fdv_step: settings.simulation.fdv_step,
            max_fdv: settings.simulation.max_fdv,
            estimate: RequestSlot::new(),
            overview: RequestSlot::new(),
            comparison: RequestSlot::new(),
            error_message: None,
            should_quit: false,
            calculator,
        }
    }

    pub fn project(&self) -> Option<&ProjectConfig> {
        self.projects.get(self.selected_project)
    }

    pub fn next_project(&mut self) {
        if !self.projects.is_empty() {
            self.selected_project = (self.selected_project + 1) % self.projects.len();
        }
    }

    pub fn previous_project(&mut self) {
        if !self.projects.is_empty() {
            self.selected_project =
                (self.selected_project + self.projects.len() - 1) % self.projects.len();
        }
    }

    /// Move the simulated FDV by `steps` increments, clamped to the slider range.
    pub fn nudge_fdv(&mut self, steps: f64) {
        self.fdv = (self.fdv + steps * self.fdv_step).clamp(0.0, self.max_fdv);
        self.revalue();
    }

    /// Re-price loaded results at the current FDV without refetching.
    pub fn revalue(&self) {
        let fdv = self.fdv;
        self.estimate.update_loaded(|estimate| {
            if estimate.valuation.fdv != fdv {
                estimate.revalue(fdv);
            }
        });
        self.comparison.update_loaded(|current| {
            if current.you.valuation.fdv != fdv || current.fren.valuation.fdv != fdv {
                let mut you = current.you.clone();
                let mut fren = current.fren.clone();
                you.revalue(fdv);
                fren.revalue(fdv);
                *current = comparison::compare(you, fren);
            }
        });
    }

    /// Fetch the estimate and account overview for the typed handle.
    /// Must be called from within a Tokio runtime.
    pub fn submit_handle(&mut self) {
        let handle = self.handle_input.trim().to_string();
        let Some(project) = self.project().map(|p| p.slug.clone()) else {
            self.set_error("No projects configured");
            return;
        };
        if handle.is_empty() {
            self.set_error("Enter a handle first");
            return;
        }

        let calculator = Arc::clone(&self.calculator);
        let fdv = self.fdv;
        let label = format!("Fetching {} rewards for @{}...", project, handle.trim_start_matches('@'));
        {
            let handle = handle.clone();
            self.estimate.submit(label, async move {
                calculator.estimate(&project, &handle, fdv).await
            });
        }

        let calculator = Arc::clone(&self.calculator);
        self.overview.submit(format!("Loading @{}", handle), async move {
            calculator.overview(&handle).await
        });

        self.comparison.cancel();
        self.error_message = None;
        self.input_mode = InputMode::Normal;
        self.current_screen = Screen::Results;
    }

    pub fn submit_fren(&mut self) {
        let you = self.handle_input.trim().to_string();
        let fren = self.fren_input.trim().to_string();
        let Some(project) = self.project().map(|p| p.slug.clone()) else {
            return;
        };
        if fren.is_empty() {
            self.input_mode = InputMode::Normal;
            return;
        }

        let calculator = Arc::clone(&self.calculator);
        let fdv = self.fdv;
        self.comparison.submit(format!("Comparing with @{}...", fren), async move {
            calculator.compare(&project, &you, &fren, fdv).await
        });
        self.input_mode = InputMode::Normal;
    }

    pub fn is_loading(&self) -> bool {
        self.estimate.state().is_loading() || self.comparison.state().is_loading()
    }

    pub fn loading_message(&self) -> Option<String> {
        if let ViewState::Loading { label } = self.estimate.state() {
            return Some(label);
        }
        if let ViewState::Loading { label } = self.comparison.state() {
            return Some(label);
        }
        None
    }

    pub fn set_error(&mut self, error: &str) {
        self.error_message = Some(error.to_string());
    }

    pub fn back_to_main(&mut self) {
        self.estimate.cancel();
        self.overview.cancel();
        self.comparison.cancel();
        self.fren_input.clear();
        self.input_mode = InputMode::Normal;
        self.current_screen = Screen::Main;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectRegistry;
    use crate::models::{LeaderboardRow, UserStatus, YapsSummary};
    use crate::upstream::client::MockLeaderboardSource;
    use std::time::Duration;

    fn app_with(mock: MockLeaderboardSource) -> App {
        let calculator = Arc::new(ScoreCalculator::new(Arc::new(mock), ProjectRegistry::builtin()));
        App::new(&Settings::default(), calculator)
    }

    fn billions_mock() -> MockLeaderboardSource {
        let mut mock = MockLeaderboardSource::new();
        mock.expect_leaderboard().returning(|handle| {
            let mindshare = if handle == "alice" { 100.0 } else { 50.0 };
            Ok(vec![LeaderboardRow::new("BILLIONS", "3M", "tier1")
                .with_mindshare(mindshare)
                .with_rank(5.0)])
        });
        mock.expect_user_status().returning(|_| Ok(UserStatus::default()));
        mock.expect_yaps().returning(|_| Ok(YapsSummary::default()));
        mock
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[test]
    fn test_fdv_nudges_are_clamped() {
        let mut app = app_with(MockLeaderboardSource::new());
        app.fdv = 0.0;
        app.nudge_fdv(-1.0);
        assert_eq!(app.fdv, 0.0);

        app.nudge_fdv(3.0);
        assert_eq!(app.fdv, 3.0 * app.fdv_step);

        app.nudge_fdv(1e9);
        assert_eq!(app.fdv, app.max_fdv);
    }

    #[test]
    fn test_project_selection_wraps() {
        let mut app = app_with(MockLeaderboardSource::new());
        let count = app.projects.len();
        assert!(count > 1);

        app.previous_project();
        assert_eq!(app.selected_project, count - 1);
        app.next_project();
        assert_eq!(app.selected_project, 0);
    }

    #[test]
    fn test_empty_handle_is_not_submitted() {
        let mut app = app_with(MockLeaderboardSource::new());
        app.handle_input = "   ".to_string();
        app.submit_handle();

        assert_eq!(app.current_screen, Screen::Main);
        assert!(app.error_message.is_some());
        assert_eq!(app.estimate.generation(), 0);
    }

    #[tokio::test]
    async fn test_fdv_change_reprices_loaded_estimate() {
        let mut app = app_with(billions_mock());
        app.selected_project = app.projects.iter().position(|p| p.slug == "billions").unwrap();
        app.handle_input = "@alice".to_string();
        app.submit_handle();
        settle().await;

        let before = app.estimate.state().loaded().cloned().unwrap();
        app.nudge_fdv(-(app.fdv / app.fdv_step) / 2.0);
        let after = app.estimate.state().loaded().cloned().unwrap();

        assert_eq!(after.score.tokens_awarded, before.score.tokens_awarded);
        assert_eq!(after.valuation.fdv, app.fdv);
        assert!((after.valuation.worth_usd * 2.0 - before.valuation.worth_usd).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_comparison_follows_fdv() {
        let mut app = app_with(billions_mock());
        app.selected_project = app.projects.iter().position(|p| p.slug == "billions").unwrap();
        app.handle_input = "alice".to_string();
        app.fren_input = "bob".to_string();
        app.submit_fren();
        settle().await;

        let comparison = app.comparison.state().loaded().cloned().unwrap();
        assert_eq!(comparison.leader_handle(), "alice");

        app.nudge_fdv(-(app.fdv / app.fdv_step));
        let repriced = app.comparison.state().loaded().cloned().unwrap();
        assert_eq!(repriced.you.valuation.worth_usd, 0.0);
        assert_eq!(repriced.you_share, 0.5);
    }

    #[tokio::test]
    async fn test_loading_message_covers_both_slots() {
        let app = app_with(MockLeaderboardSource::new());
        assert_eq!(app.loading_message(), None);

        app.comparison.submit("Comparing with @bob...", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(crate::models::YapScoreError::Cancelled("bob".to_string()))
        });
        assert!(app.is_loading());
        assert_eq!(app.loading_message().as_deref(), Some("Comparing with @bob..."));

        app.estimate.submit("Fetching billions rewards for @alice...", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(crate::models::YapScoreError::Cancelled("alice".to_string()))
        });
        assert_eq!(
            app.loading_message().as_deref(),
            Some("Fetching billions rewards for @alice...")
        );

        app.estimate.cancel();
        app.comparison.cancel();
        assert_eq!(app.loading_message(), None);
    }
}
