use ratatui::{layout::Rect, Frame};

use crate::{
    ui::{render_exam, render_results, render_selector},
    App, AppState,
};

/// A UI Screen boundary: renders one application state into `area`
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
}

/// Interval picker shown before an exam
pub struct SelectorScreen;

impl Screen for SelectorScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_selector(app, f, area);
    }
}

pub struct ExamScreen;

impl Screen for ExamScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_exam(app, f, area);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_results(app, f, area);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Selecting => Box::new(SelectorScreen),
        AppState::Exam => Box::new(ExamScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
