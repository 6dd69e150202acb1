//! Step Indicator
//!
//! Stateless progress line shown above every wizard step.

use super::wizard::WizardStep;
use super::wizard_render::{ACCENT_GOLD, BRAND_BLUE, BRAND_GOLD};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Position of a step relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

impl StepState {
    fn marker(&self) -> &'static str {
        match self {
            Self::Completed => "✓",
            Self::Active => "●",
            Self::Pending => "○",
        }
    }

    fn style(&self) -> Style {
        match self {
            Self::Completed => Style::default().fg(BRAND_BLUE),
            Self::Active => Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
            Self::Pending => Style::default().fg(Color::DarkGray),
        }
    }
}

pub fn step_state(index: usize, current: usize) -> StepState {
    match index.cmp(&current) {
        std::cmp::Ordering::Less => StepState::Completed,
        std::cmp::Ordering::Equal => StepState::Active,
        std::cmp::Ordering::Greater => StepState::Pending,
    }
}

/// One styled line: `✓ Select Bus ─ ● Bus Data ─ ○ Line Data ...`
pub fn render_step_indicator(current: WizardStep) -> Line<'static> {
    let current_index = current.index();
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(WizardStep::ALL.len() * 2);

    for (i, step) in WizardStep::ALL.iter().enumerate() {
        if i > 0 {
            let connector_color = if i <= current_index {
                ACCENT_GOLD
            } else {
                Color::DarkGray
            };
            spans.push(Span::styled(" ─ ", Style::default().fg(connector_color)));
        }

        let state = step_state(i, current_index);
        spans.push(Span::styled(
            format!("{} {}", state.marker(), step.display_name()),
            state.style(),
        ));
    }

    Line::from(spans)
}
