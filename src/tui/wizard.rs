//! Detection Wizard
//!
//! Nine-step linear workflow: collect grid data, run the mock model checks,
//! identify suspected nodes, collect PMU readings, then hand the snapshot to
//! the analysis backend.

use super::events::keys;
use super::matrix_editor::MatrixEditor;
use crate::analysis::{AnalysisReport, AnalysisRequest, AnalysisResponse};
use crate::detection::{
    self, CheckOutcome, NodePair, OutcomeSource, RandomOutcomes, DEFAULT_CANDIDATE_PAIRS,
};
use crate::matrix::{Matrix, BUS_COLS, BUS_ROWS, LINE_COLS, LINE_ROWS};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const BUS_LABEL: &str = "Insert Bus Data (33x3 Matrix) (Paste to fill every value)";
const LINE_LABEL: &str = "Enter Line Data (32x4 Matrix) (Paste to fill every value)";

fn bus_editor(seed: &[Vec<f64>]) -> MatrixEditor {
    MatrixEditor::new(Matrix::from_rows(BUS_ROWS, BUS_COLS, seed), BUS_LABEL)
}

fn line_editor(seed: &[Vec<f64>]) -> MatrixEditor {
    MatrixEditor::new(Matrix::from_rows(LINE_ROWS, LINE_COLS, seed), LINE_LABEL)
}

/// Current step in the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    BusSelect,
    BusData,
    LineData,
    Lstm,
    Rf,
    Suspected,
    PmuLocation,
    VfValues,
    Results,
}

impl WizardStep {
    pub const ALL: [WizardStep; 9] = [
        Self::BusSelect,
        Self::BusData,
        Self::LineData,
        Self::Lstm,
        Self::Rf,
        Self::Suspected,
        Self::PmuLocation,
        Self::VfValues,
        Self::Results,
    ];

    /// Position in the fixed order (0-based)
    pub fn index(&self) -> usize {
        match self {
            Self::BusSelect => 0,
            Self::BusData => 1,
            Self::LineData => 2,
            Self::Lstm => 3,
            Self::Rf => 4,
            Self::Suspected => 5,
            Self::PmuLocation => 6,
            Self::VfValues => 7,
            Self::Results => 8,
        }
    }

    /// Stable identifier used in logs
    pub fn slug(&self) -> &'static str {
        match self {
            Self::BusSelect => "bus-select",
            Self::BusData => "bus-data",
            Self::LineData => "line-data",
            Self::Lstm => "lstm",
            Self::Rf => "rf",
            Self::Suspected => "suspected",
            Self::PmuLocation => "pmu-location",
            Self::VfValues => "vf-values",
            Self::Results => "results",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BusSelect => "Select Bus",
            Self::BusData => "Bus Data",
            Self::LineData => "Line Data",
            Self::Lstm => "LSTM",
            Self::Rf => "RF",
            Self::Suspected => "Suspected Nodes",
            Self::PmuLocation => "PMU Location",
            Self::VfValues => "Available PMU Voltage",
            Self::Results => "Result",
        }
    }

    /// Following step, `None` at the end
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

/// Lifecycle of the backend request issued on entering results
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Loading,
    Ready(AnalysisResponse),
    /// Logged only; the results view falls back to its empty layout
    Failed,
}

/// Backend request the app should issue on the wizard's behalf
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub payload: AnalysisRequest,
}

/// What the app should do after a wizard event
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    /// Nothing special
    None,
    /// Spawn the analysis request
    Fetch(FetchRequest),
}

/// Wizard state
pub struct Wizard {
    pub step: WizardStep,

    // Step 1
    pub selected_bus: String,

    // Steps 2-3
    pub bus_editor: MatrixEditor,
    pub line_editor: MatrixEditor,

    // Steps 4-6
    pub lstm_result: Option<CheckOutcome>,
    pub rf_result: Option<CheckOutcome>,
    pub suspected_nodes: Option<NodePair>,
    /// Both checks came back normal and the suspected step was skipped
    pub normal_condition: bool,

    // Steps 7-8: raw field text, parsed on demand
    pub pmu_inputs: [String; 2],
    pub vf_inputs: [String; 2],
    pub focused_field: usize,

    // Step 9
    pub analysis: AnalysisState,

    generation: u64,
    source: Box<dyn OutcomeSource>,
    candidates: Vec<NodePair>,
    /// Grid contents restored by `reset`
    bus_seed: Vec<Vec<f64>>,
    line_seed: Vec<Vec<f64>>,
}

impl Wizard {
    /// Create a wizard drawing check outcomes from OS entropy
    pub fn new(candidates: Vec<NodePair>) -> Self {
        Self::with_source(candidates, Box::new(RandomOutcomes::from_entropy()))
    }

    /// Create a wizard with an explicit outcome source
    pub fn with_source(candidates: Vec<NodePair>, source: Box<dyn OutcomeSource>) -> Self {
        let candidates = if candidates.is_empty() {
            DEFAULT_CANDIDATE_PAIRS.to_vec()
        } else {
            candidates
        };

        Self {
            step: WizardStep::BusSelect,
            selected_bus: String::new(),
            bus_editor: bus_editor(&[]),
            line_editor: line_editor(&[]),
            lstm_result: None,
            rf_result: None,
            suspected_nodes: None,
            normal_condition: false,
            pmu_inputs: [String::new(), String::new()],
            vf_inputs: [String::new(), String::new()],
            focused_field: 0,
            analysis: AnalysisState::Idle,
            generation: 0,
            source,
            candidates,
            bus_seed: Vec::new(),
            line_seed: Vec::new(),
        }
    }

    /// Pre-fill the bus and line grids. Missing cells read as 0 and the
    /// seed survives `reset`.
    pub fn with_grid_data(mut self, bus: Vec<Vec<f64>>, line: Vec<Vec<f64>>) -> Self {
        self.bus_editor = bus_editor(&bus);
        self.line_editor = line_editor(&line);
        self.bus_seed = bus;
        self.line_seed = line;
        self
    }

    /// Current fetch generation; bumped by every reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn candidates(&self) -> &[NodePair] {
        &self.candidates
    }

    /// PMU bus numbers; empty or unparseable fields read as 0
    pub fn pmu_location(&self) -> [u32; 2] {
        [
            self.pmu_inputs[0].parse().unwrap_or(0),
            self.pmu_inputs[1].parse().unwrap_or(0),
        ]
    }

    /// PMU voltages; empty or unparseable fields read as 0
    pub fn vf_values(&self) -> [f64; 2] {
        [
            self.vf_inputs[0].parse().unwrap_or(0.0),
            self.vf_inputs[1].parse().unwrap_or(0.0),
        ]
    }

    /// Whether the footer's Next is enabled
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::BusSelect => !self.selected_bus.is_empty(),
            WizardStep::Lstm => self.lstm_result.is_some(),
            WizardStep::Rf => self.rf_result.is_some(),
            WizardStep::Suspected => self.suspected_nodes.is_some(),
            WizardStep::Results => false,
            WizardStep::BusData
            | WizardStep::LineData
            | WizardStep::PmuLocation
            | WizardStep::VfValues => true,
        }
    }

    /// Move to the next step if the current one is satisfied
    pub fn advance(&mut self) -> WizardAction {
        if !self.can_advance() {
            return WizardAction::None;
        }
        let Some(next) = self.step.next() else {
            return WizardAction::None;
        };

        self.bus_editor.commit_edit();
        self.line_editor.commit_edit();
        self.enter(next)
    }

    fn enter(&mut self, step: WizardStep) -> WizardAction {
        tracing::debug!("Wizard step {} -> {}", self.step.slug(), step.slug());
        self.step = step;
        self.focused_field = 0;

        match step {
            WizardStep::Suspected
                if self.lstm_result.is_some_and(|o| o.is_normal())
                    && self.rf_result.is_some_and(|o| o.is_normal()) =>
            {
                tracing::info!("Both checks normal, skipping suspected node identification");
                self.normal_condition = true;
                self.enter(WizardStep::Results)
            }
            WizardStep::Results => self.begin_fetch(),
            _ => WizardAction::None,
        }
    }

    fn begin_fetch(&mut self) -> WizardAction {
        let payload = self.payload();
        match serde_json::to_string(&payload) {
            Ok(json) => tracing::debug!("Analysis payload: {}", json),
            Err(e) => tracing::warn!("Failed to serialize payload for logging: {}", e),
        }
        self.analysis = AnalysisState::Loading;
        WizardAction::Fetch(FetchRequest {
            generation: self.generation,
            payload,
        })
    }

    /// Snapshot of everything collected so far, in the backend's shape
    pub fn payload(&self) -> AnalysisRequest {
        AnalysisRequest {
            selected_bus: self.selected_bus.clone(),
            bus_data: self.bus_editor.matrix().to_rows(),
            line_data: self.line_editor.matrix().to_rows(),
            vf_values: self.vf_values(),
            pmu_location: self.pmu_location(),
            suspected_nodes: self.suspected_nodes,
        }
    }

    pub fn run_lstm_check(&mut self) {
        let outcome = detection::run_lstm_check(self.source.as_mut());
        tracing::debug!("LSTM check: {}", outcome);
        self.lstm_result = Some(outcome);
    }

    pub fn run_rf_check(&mut self) {
        let outcome = detection::run_rf_check(self.source.as_mut());
        tracing::debug!("RF check: {}", outcome);
        self.rf_result = Some(outcome);
    }

    pub fn identify_suspected_nodes(&mut self) {
        self.suspected_nodes = detection::pick_suspected_pair(self.source.as_mut(), &self.candidates);
        if let Some(pair) = self.suspected_nodes {
            tracing::debug!("Suspected nodes: {} and {}", pair.node1, pair.node2);
        }
    }

    /// Clear every collected value and return to the first step.
    /// Any in-flight response becomes stale.
    pub fn reset(&mut self) {
        tracing::debug!("Wizard reset from {}", self.step.slug());
        self.step = WizardStep::BusSelect;
        self.selected_bus.clear();
        self.bus_editor = bus_editor(&self.bus_seed);
        self.line_editor = line_editor(&self.line_seed);
        self.lstm_result = None;
        self.rf_result = None;
        self.suspected_nodes = None;
        self.normal_condition = false;
        self.pmu_inputs = [String::new(), String::new()];
        self.vf_inputs = [String::new(), String::new()];
        self.focused_field = 0;
        self.analysis = AnalysisState::Idle;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Record a finished fetch. Returns `false` when the result belongs to
    /// an earlier generation and was dropped.
    pub fn apply_analysis(
        &mut self,
        generation: u64,
        outcome: std::result::Result<AnalysisResponse, String>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale analysis result (generation {} != {})",
                generation,
                self.generation
            );
            return false;
        }

        self.analysis = match outcome {
            Ok(response) => AnalysisState::Ready(response),
            Err(e) => {
                tracing::error!("Analysis request failed: {}", e);
                AnalysisState::Failed
            }
        };
        true
    }

    /// Report for the results view, once a response is in
    pub fn report(&self) -> Option<AnalysisReport> {
        match &self.analysis {
            AnalysisState::Ready(response) => {
                Some(AnalysisReport::new(self.suspected_nodes, response))
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.analysis == AnalysisState::Loading
    }

    /// Matrix editor for the current step, if it has one
    pub fn active_editor(&self) -> Option<&MatrixEditor> {
        match self.step {
            WizardStep::BusData => Some(&self.bus_editor),
            WizardStep::LineData => Some(&self.line_editor),
            _ => None,
        }
    }

    fn active_editor_mut(&mut self) -> Option<&mut MatrixEditor> {
        match self.step {
            WizardStep::BusData => Some(&mut self.bus_editor),
            WizardStep::LineData => Some(&mut self.line_editor),
            _ => None,
        }
    }

    /// Handle key events for the current step
    pub fn handle_key(&mut self, event: KeyEvent) -> WizardAction {
        if keys::is_reset(&event) {
            self.reset();
            return WizardAction::None;
        }

        match self.step {
            WizardStep::BusSelect => self.handle_bus_select_key(event),
            WizardStep::BusData | WizardStep::LineData => self.handle_matrix_key(event),
            WizardStep::Lstm => self.handle_check_key(event, Self::run_lstm_check),
            WizardStep::Rf => self.handle_check_key(event, Self::run_rf_check),
            WizardStep::Suspected => self.handle_suspected_key(event),
            WizardStep::PmuLocation => self.handle_field_key(event, accepts_pmu_char),
            WizardStep::VfValues => self.handle_field_key(event, accepts_vf_char),
            WizardStep::Results => self.handle_results_key(event),
        }
    }

    /// Terminal paste: fills the active grid, or appends to the bus name
    pub fn handle_paste(&mut self, text: &str) {
        match self.step {
            WizardStep::BusSelect => {
                self.selected_bus
                    .extend(text.chars().filter(|c| !c.is_control()));
            }
            _ => {
                if let Some(editor) = self.active_editor_mut() {
                    editor.handle_paste(text);
                }
            }
        }
    }

    // --- Step-specific key handlers ---

    fn handle_bus_select_key(&mut self, event: KeyEvent) -> WizardAction {
        match event.code {
            KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.selected_bus.push(c);
            }
            KeyCode::Backspace => {
                self.selected_bus.pop();
            }
            KeyCode::Enter => return self.advance(),
            _ => {}
        }
        WizardAction::None
    }

    fn handle_matrix_key(&mut self, event: KeyEvent) -> WizardAction {
        let consumed = self
            .active_editor_mut()
            .is_some_and(|editor| editor.handle_key(event));
        if !consumed && keys::is_enter(&event) {
            return self.advance();
        }
        WizardAction::None
    }

    fn handle_check_key(&mut self, event: KeyEvent, run: fn(&mut Self)) -> WizardAction {
        match event.code {
            KeyCode::Char(' ') | KeyCode::Char('c') => run(self),
            KeyCode::Enter => return self.advance(),
            _ => {}
        }
        WizardAction::None
    }

    fn handle_suspected_key(&mut self, event: KeyEvent) -> WizardAction {
        match event.code {
            KeyCode::Char(' ') | KeyCode::Char('i') => self.identify_suspected_nodes(),
            KeyCode::Enter => return self.advance(),
            _ => {}
        }
        WizardAction::None
    }

    fn handle_field_key(&mut self, event: KeyEvent, accepts: fn(&str, char) -> bool) -> WizardAction {
        let field = self.focused_field.min(1);
        let inputs = if self.step == WizardStep::PmuLocation {
            &mut self.pmu_inputs
        } else {
            &mut self.vf_inputs
        };

        match event.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focused_field = 1 - field;
            }
            KeyCode::Char(c) if accepts(&inputs[field], c) => {
                inputs[field].push(c);
            }
            KeyCode::Backspace => {
                inputs[field].pop();
            }
            KeyCode::Enter => return self.advance(),
            _ => {}
        }
        WizardAction::None
    }

    fn handle_results_key(&mut self, event: KeyEvent) -> WizardAction {
        if matches!(event.code, KeyCode::Char('r') | KeyCode::Char('R'))
            && event.modifiers.is_empty()
        {
            self.reset();
        }
        WizardAction::None
    }
}

fn accepts_pmu_char(_current: &str, c: char) -> bool {
    c.is_ascii_digit()
}

fn accepts_vf_char(current: &str, c: char) -> bool {
    match c {
        '0'..='9' => true,
        '.' => !current.contains('.'),
        '-' => current.is_empty(),
        _ => false,
    }
}
