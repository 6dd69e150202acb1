//! Wizard Rendering
//!
//! Render functions for each step of the detection wizard.

use super::app::App;
use super::step_indicator::render_step_indicator;
use super::wizard::{Wizard, WizardStep};
use crate::analysis::report::fixed4;
use crate::analysis::AttackVerdict;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Main color palette
pub(crate) const BRAND_BLUE: Color = Color::Rgb(70, 130, 180);
pub(crate) const BRAND_GOLD: Color = Color::Rgb(218, 165, 32);
pub(crate) const ACCENT_GOLD: Color = Color::Rgb(184, 134, 11);
const ALERT_RED: Color = Color::Rgb(220, 80, 80);

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Lines used by header, indicator and footer around the step content
const CHROME_LINES: u16 = 14;

/// Render the entire wizard
pub fn render_wizard(f: &mut Frame, app: &App) {
    let area = f.area();

    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(area.height.saturating_sub(2)),
            Constraint::Min(0),
        ])
        .split(area);

    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(110.min(area.width.saturating_sub(2))),
            Constraint::Min(0),
        ])
        .split(v_chunks[1]);

    let wizard_area = h_chunks[1];
    let wizard = &app.wizard;
    let grid_rows = wizard_area.height.saturating_sub(CHROME_LINES).max(3) as usize;

    let mut lines: Vec<Line<'static>> = Vec::new();

    // Header
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Load Redistribution (LR) Attack Detection",
        Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        "Radial Distribution System Analysis",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    lines.push(render_step_indicator(wizard.step));
    lines.push(Line::from(""));

    // Step-specific content
    match wizard.step {
        WizardStep::BusSelect => render_bus_select(&mut lines, wizard),
        WizardStep::BusData | WizardStep::LineData => {
            if let Some(editor) = wizard.active_editor() {
                lines.extend(editor.render_lines(grid_rows));
            }
        }
        WizardStep::Lstm => render_check(&mut lines, "LSTM Check", wizard.lstm_result),
        WizardStep::Rf => render_check(&mut lines, "RF Model Check", wizard.rf_result),
        WizardStep::Suspected => render_suspected(&mut lines, wizard),
        WizardStep::PmuLocation => render_fields(
            &mut lines,
            wizard,
            "PMU Locations",
            ["PMU Location 1", "PMU Location 2"],
            &wizard.pmu_inputs,
            "Enter the bus numbers where PMUs are installed",
        ),
        WizardStep::VfValues => render_fields(
            &mut lines,
            wizard,
            "Enter PMU Voltage Values",
            ["Voltage at PMU 1", "Voltage at PMU 2"],
            &wizard.vf_inputs,
            "Enter the voltage values for PMU 1 & 2 with precision up to 2 decimal places",
        ),
        WizardStep::Results => render_results(&mut lines, app),
    }

    // Navigation footer
    lines.push(Line::from(""));
    lines.push(render_footer(wizard));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BRAND_BLUE))
                .title(Span::styled(
                    format!(
                        " LR Attack Detection ({}/{}) ",
                        wizard.step.index() + 1,
                        WizardStep::ALL.len()
                    ),
                    Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
                )),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, wizard_area);
}

// --- Individual step renderers ---
// All functions produce Vec<Line<'static>> by using owned strings throughout.

fn render_bus_select(lines: &mut Vec<Line<'static>>, wizard: &Wizard) {
    lines.push(Line::from(Span::styled(
        "Select Bus:",
        Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" > ", Style::default().fg(ACCENT_GOLD)),
        Span::styled(
            format!("{}_", wizard.selected_bus),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
    ]));
}

fn render_check(
    lines: &mut Vec<Line<'static>>,
    title: &'static str,
    result: Option<crate::detection::CheckOutcome>,
) {
    lines.push(Line::from(vec![
        Span::styled(
            "[Space] ",
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ),
        Span::styled(title, Style::default().fg(Color::White)),
    ]));
    lines.push(Line::from(""));

    if let Some(outcome) = result {
        lines.push(Line::from(vec![
            Span::styled("Result: ", Style::default().fg(BRAND_BLUE)),
            Span::styled(
                outcome.to_string(),
                Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
}

fn render_suspected(lines: &mut Vec<Line<'static>>, wizard: &Wizard) {
    lines.push(Line::from(vec![
        Span::styled(
            "[Space] ",
            Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Identify Suspected Nodes", Style::default().fg(Color::White)),
    ]));
    lines.push(Line::from(""));

    if let Some(pair) = wizard.suspected_nodes {
        lines.push(Line::from(vec![
            Span::raw("Suspected Nodes: "),
            Span::styled(
                pair.node1.to_string(),
                Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" and "),
            Span::styled(
                pair.node2.to_string(),
                Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
}

fn render_fields(
    lines: &mut Vec<Line<'static>>,
    wizard: &Wizard,
    heading: &'static str,
    labels: [&'static str; 2],
    inputs: &[String; 2],
    hint: &'static str,
) {
    lines.push(Line::from(Span::styled(
        heading,
        Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (i, label) in labels.iter().enumerate() {
        let focused = wizard.focused_field == i;
        let value = if inputs[i].is_empty() && !focused {
            "0".to_string()
        } else if focused {
            format!("{}_", inputs[i])
        } else {
            inputs[i].clone()
        };

        lines.push(Line::from(vec![
            Span::styled(
                if focused { " > " } else { "   " },
                Style::default().fg(ACCENT_GOLD),
            ),
            Span::styled(
                format!("{}: ", label),
                Style::default().fg(if focused { BRAND_BLUE } else { Color::DarkGray }),
            ),
            Span::styled(
                value,
                Style::default()
                    .fg(if focused { Color::White } else { Color::DarkGray })
                    .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
}

fn render_results(lines: &mut Vec<Line<'static>>, app: &App) {
    let wizard = &app.wizard;
    let loading = wizard.is_loading();

    lines.push(Line::from(Span::styled(
        "Analysis Results",
        Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    if wizard.normal_condition {
        lines.push(Line::from(Span::styled(
            "✓ Normal condition",
            Style::default().fg(Color::Green),
        )));
    }

    if loading {
        let frame = SPINNER_FRAMES[app.animation_frame % SPINNER_FRAMES.len()];
        lines.push(Line::from(Span::styled(
            format!("{} Loading...", frame),
            Style::default().fg(BRAND_BLUE),
        )));
        return;
    }

    if wizard.suspected_nodes.is_none() {
        lines.push(Line::from(Span::styled(
            "No attack detected",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
    }

    let Some(report) = wizard.report() else {
        return;
    };

    if report.suspected.is_some() {
        lines.push(Line::from(
            report
                .nodes
                .iter()
                .flat_map(|node| {
                    [
                        Span::styled(
                            format!("  Node {} Loadability: ", node.label),
                            Style::default().fg(BRAND_BLUE),
                        ),
                        Span::styled(
                            fixed4(node.loadability),
                            Style::default().fg(BRAND_GOLD).add_modifier(Modifier::BOLD),
                        ),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Analysis Details:",
        Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
    )));

    for node in &report.nodes {
        lines.push(Line::from(Span::styled(
            format!("Node {} Details:", node.label),
            Style::default().fg(ACCENT_GOLD),
        )));
        lines.push(Line::from(format!(
            "Actual Load: Active {} kW, Reactive {} kVar",
            fixed4(node.actual.active),
            fixed4(node.actual.reactive)
        )));
        lines.push(Line::from(format!(
            "LR Attack Load: Active {} kW, Reactive {} kVar",
            fixed4(node.attack.active),
            fixed4(node.attack.reactive)
        )));
    }

    lines.push(Line::from(""));
    let verdict_color = match report.verdict {
        AttackVerdict::AttackDetected => ALERT_RED,
        AttackVerdict::NoAttack => Color::Green,
        AttackVerdict::Inconclusive => Color::Yellow,
    };
    lines.push(Line::from(vec![
        Span::styled("Status: ", Style::default().fg(BRAND_BLUE)),
        Span::styled(
            report.verdict.message(),
            Style::default().fg(verdict_color).add_modifier(Modifier::BOLD),
        ),
    ]));
}

fn render_footer(wizard: &Wizard) -> Line<'static> {
    let mut footer: Vec<Span<'static>> = vec![
        Span::styled(
            " [Ctrl+C] ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Quit  ", Style::default().fg(Color::White)),
        Span::styled(
            "[Ctrl+R] ",
            Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Start Over  ", Style::default().fg(Color::White)),
    ];

    match wizard.step {
        WizardStep::Results => {
            footer.push(Span::styled(
                "[r] ",
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            ));
            footer.push(Span::styled("Check Again", Style::default().fg(Color::White)));
            return Line::from(footer);
        }
        WizardStep::BusData | WizardStep::LineData => {
            footer.push(Span::styled(
                "[Arrows] ",
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            ));
            footer.push(Span::styled("Move  ", Style::default().fg(Color::White)));
        }
        WizardStep::PmuLocation | WizardStep::VfValues => {
            footer.push(Span::styled(
                "[Tab] ",
                Style::default().fg(BRAND_BLUE).add_modifier(Modifier::BOLD),
            ));
            footer.push(Span::styled("Next Field  ", Style::default().fg(Color::White)));
        }
        _ => {}
    }

    let enabled = wizard.can_advance();
    footer.push(Span::styled(
        "[Enter] ",
        Style::default()
            .fg(if enabled { ACCENT_GOLD } else { Color::DarkGray })
            .add_modifier(Modifier::BOLD),
    ));
    footer.push(Span::styled(
        "Next",
        Style::default().fg(if enabled { Color::White } else { Color::DarkGray }),
    ));

    Line::from(footer)
}
