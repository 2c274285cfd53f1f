//! # Costing Workflow
//!
//! A state machine over [`Session`] that decides which input comes next.
//!
//! ```text
//! SelectRoller ──select──► AskConstants ──no──► Input ◄──save── EditConstants
//!                               └──────yes──────────────────────────┘
//! Input ──calculate──► Compiled ──add frame──► FrameInput ──cost──► FrameCompiled
//!   ▲                    │  ▲                                          │
//!   │                    │  └───────────────back──────────────────────┤
//!   │                    └──another roller──► SelectRoller ◄──────────┤
//!   │                                              FrameInput ◄──more─┘
//! ```
//!
//! Every (stage, action) pair has an outcome. An action that does not apply
//! to the current stage leaves it unchanged and reports a warning; a rejected
//! calculation reports the error. Committed lines are only ever appended.
//!
//! ## Example
//!
//! ```rust
//! use idler_core::catalog::RollerVariant;
//! use idler_core::calculations::QuantityMode;
//! use idler_core::geometry::{RollerDimensions, WeightMethod};
//! use idler_core::session::Session;
//! use idler_core::workflow::{step, Action, RollerForm, Stage};
//!
//! let mut session = Session::new();
//! step(&mut session, Action::SelectRoller(Some(RollerVariant::CarryingWithoutFrame)));
//! step(&mut session, Action::ChangeConstants(false));
//!
//! let form = RollerForm {
//!     dimensions: RollerDimensions {
//!         pipe_diameter_mm: 89.0,
//!         face_width_mm: 190.0,
//!         wall_thickness_mm: 3.2,
//!         shaft_diameter_mm: 25.0,
//!         shaft_length_mm: 220.0,
//!     },
//!     quantity: 1,
//!     quantity_mode: QuantityMode::Single,
//!     weight_method: WeightMethod::ThinShell,
//! };
//! let outcome = step(&mut session, Action::CalculateRoller(form));
//! assert_eq!(outcome.to, Stage::Compiled);
//! assert_eq!(session.results.rollers().len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::{
    frame, roller, BeltWidthChoice, FrameCostingRecord, FrameInput, FrameRequest, QuantityMode,
    RollerCostingRecord, RollerSpec,
};
use crate::catalog::{FrameFamily, RollerVariant};
use crate::constants::ConstantKey;
use crate::errors::CalcError;
use crate::geometry::{RollerDimensions, WeightMethod};
use crate::session::Session;

/// Where the workflow stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for a roller variant
    #[default]
    SelectRoller,
    /// Asking whether to change the constants
    AskConstants,
    /// Editing constants field by field
    EditConstants,
    /// Waiting for roller dimensions and quantity
    Input,
    /// Roller line committed
    Compiled,
    /// Waiting for frame parameters
    FrameInput,
    /// Frame line committed
    FrameCompiled,
}

impl Stage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::SelectRoller => "Select roller",
            Stage::AskConstants => "Change constants?",
            Stage::EditConstants => "Edit constants",
            Stage::Input => "Roller input",
            Stage::Compiled => "Roller costing",
            Stage::FrameInput => "Frame input",
            Stage::FrameCompiled => "Frame costing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Roller form contents. The variant is the one chosen at `SelectRoller`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollerForm {
    pub dimensions: RollerDimensions,
    pub quantity: u32,
    #[serde(default)]
    pub quantity_mode: QuantityMode,
    #[serde(default)]
    pub weight_method: WeightMethod,
}

impl RollerForm {
    pub fn into_spec(self, variant: RollerVariant) -> RollerSpec {
        RollerSpec {
            variant,
            dimensions: self.dimensions,
            quantity: self.quantity,
            quantity_mode: self.quantity_mode,
            weight_method: self.weight_method,
        }
    }
}

/// User actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Choose a roller variant; `None` is the unselected placeholder
    SelectRoller(Option<RollerVariant>),
    /// Answer the "change constants?" question
    ChangeConstants(bool),
    /// Override one constant
    SetConstant { key: ConstantKey, value: f64 },
    /// Leave the constants editor
    SaveConstants,
    /// Cost the roller form
    CalculateRoller(RollerForm),
    /// Open the frame form for the last roller
    CalculateFrame,
    /// Cost a frame for the last roller
    AddFrame(FrameRequest),
    /// Cost another frame for the same roller
    AddMoreFrames,
    /// Back to the roller costing view
    BackToRoller,
    /// Start a new roller line, keeping the tables
    AddAnotherRoller,
    /// Clear the tables and start over
    Reset,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectRoller(_) => "select roller",
            Action::ChangeConstants(_) => "change constants",
            Action::SetConstant { .. } => "set constant",
            Action::SaveConstants => "save constants",
            Action::CalculateRoller(_) => "calculate roller",
            Action::CalculateFrame => "calculate frame",
            Action::AddFrame(_) => "add frame",
            Action::AddMoreFrames => "add more frames",
            Action::BackToRoller => "back to roller",
            Action::AddAnotherRoller => "add another roller",
            Action::Reset => "reset",
        }
    }
}

/// What an action did besides moving the cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "details", rename_all = "snake_case")]
pub enum StepEvent {
    /// Cursor moved (or stayed) with nothing else to report
    Moved,
    /// A constant was overridden
    ConstantSet { key: ConstantKey, value: f64 },
    /// A roller line was committed
    RollerRecorded(RollerCostingRecord),
    /// A frame line was committed
    FrameRecorded(FrameCostingRecord),
    /// The action did not apply here
    Warning(String),
    /// The calculation was refused
    Rejected(CalcError),
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub from: Stage,
    pub to: Stage,
    pub event: StepEvent,
}

impl StepOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self.event, StepEvent::Warning(_) | StepEvent::Rejected(_))
    }
}

/// Apply one action to the session.
///
/// Never fails: errors are reported in the outcome and the session is left
/// in the stage the table below names.
pub fn step(session: &mut Session, action: Action) -> StepOutcome {
    let from = session.stage;
    let event = match (from, action) {
        (_, Action::Reset) => {
            session.reset();
            StepEvent::Moved
        }

        (Stage::SelectRoller, Action::SelectRoller(None)) => {
            warning(from, "Please select a roller type")
        }
        (Stage::SelectRoller, Action::SelectRoller(Some(variant))) => {
            session.selected_variant = Some(variant);
            session.stage = Stage::AskConstants;
            StepEvent::Moved
        }

        (Stage::AskConstants, Action::ChangeConstants(true)) => {
            session.stage = Stage::EditConstants;
            StepEvent::Moved
        }
        (Stage::AskConstants, Action::ChangeConstants(false)) => {
            session.constants = session.base_constants;
            session.stage = Stage::Input;
            StepEvent::Moved
        }

        (Stage::EditConstants, Action::SetConstant { key, value }) => {
            match session.constants.set(key, value) {
                Ok(()) => StepEvent::ConstantSet { key, value },
                Err(e) => rejected(from, e),
            }
        }
        (Stage::EditConstants, Action::SaveConstants) => {
            tracing::info!(
                overridden = ?session.constants.overridden_keys(),
                "constants saved"
            );
            session.stage = Stage::Input;
            StepEvent::Moved
        }

        (Stage::Input, Action::CalculateRoller(form)) => match session.selected_variant {
            None => warning(from, "Please select a roller type"),
            Some(variant) => calculate_roller(session, form.into_spec(variant)),
        },

        (Stage::Compiled, Action::CalculateFrame) => match &session.last_roller {
            Some(last) if !last.variant.supports_frame() => {
                let err = CalcError::unsupported_frame_family(last.variant.display_name());
                rejected(from, err)
            }
            Some(_) => {
                session.stage = Stage::FrameInput;
                StepEvent::Moved
            }
            None => warning(from, "No roller has been costed yet"),
        },
        (Stage::Compiled | Stage::FrameCompiled, Action::AddAnotherRoller) => {
            session.stage = Stage::SelectRoller;
            session.selected_variant = None;
            StepEvent::Moved
        }

        (Stage::FrameInput, Action::AddFrame(request)) => add_frame(session, request),
        (Stage::FrameInput | Stage::FrameCompiled, Action::BackToRoller) => {
            session.stage = Stage::Compiled;
            StepEvent::Moved
        }

        (Stage::FrameCompiled, Action::AddMoreFrames) => {
            session.stage = Stage::FrameInput;
            StepEvent::Moved
        }

        (stage, action) => warning(
            stage,
            &format!("'{}' is not available at '{}'", action.name(), stage),
        ),
    };

    StepOutcome {
        from,
        to: session.stage,
        event,
    }
}

fn calculate_roller(session: &mut Session, spec: RollerSpec) -> StepEvent {
    match roller::compute_roller_costing(&spec, &session.constants) {
        Ok(record) => {
            session.record_roller(record.clone());
            session.stage = Stage::Compiled;
            StepEvent::RollerRecorded(record)
        }
        Err(e) => rejected(session.stage, e),
    }
}

fn add_frame(session: &mut Session, request: FrameRequest) -> StepEvent {
    let Some(last) = session.last_roller.as_ref() else {
        session.stage = Stage::Compiled;
        return warning(Stage::FrameInput, "No roller has been costed yet");
    };

    let belt_width = match request.manual_belt_width_mm {
        Some(belt_width_mm) => BeltWidthChoice::Manual { belt_width_mm },
        None => BeltWidthChoice::Auto {
            roller_weight_kg: last.weight_kg,
        },
    };
    let input = FrameInput {
        variant: last.variant,
        belt_width,
        edited_bom: request.edited_bom,
        declared_quantity: request.declared_quantity,
        set_quantity: last.set_quantity,
    };

    match frame::compute_frame_costing(&input, &session.constants) {
        Ok(record) => {
            session.record_frame(record.clone());
            session.stage = Stage::FrameCompiled;
            StepEvent::FrameRecorded(record)
        }
        Err(e) => {
            if e.is_frame_rejection() {
                session.stage = Stage::Compiled;
            }
            rejected(Stage::FrameInput, e)
        }
    }
}

/// Frame family of the last roller, when it has one
pub fn current_frame_family(session: &Session) -> Option<FrameFamily> {
    session
        .last_roller
        .as_ref()
        .and_then(|r| r.variant.frame_family())
}

fn warning(stage: Stage, message: &str) -> StepEvent {
    tracing::warn!(%stage, "{}", message);
    StepEvent::Warning(message.to_string())
}

fn rejected(stage: Stage, error: CalcError) -> StepEvent {
    tracing::warn!(%stage, code = error.error_code(), "{}", error);
    StepEvent::Rejected(error)
}
