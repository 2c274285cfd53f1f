//! # Costing Session
//!
//! The `Session` is the caller-owned state of one costing run: the constants
//! in force, where the workflow cursor stands, the last roller costed and the
//! committed tables. Sessions serialize to JSON.
//!
//! ## Structure
//!
//! ```text
//! Session
//! ├── meta: SessionMetadata (id, version, timestamps)
//! ├── constants / base_constants: CostConstants
//! ├── stage / selected_variant / last_roller (workflow cursor)
//! └── results: ResultAccumulator (roller and frame tables)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use idler_core::session::Session;
//!
//! let session = Session::new();
//! assert!(session.results.is_empty());
//!
//! let json = serde_json::to_string_pretty(&session).unwrap();
//! assert!(json.contains("select_roller"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accumulator::ResultAccumulator;
use crate::calculations::{FrameCostingRecord, RollerCostingRecord};
use crate::catalog::RollerVariant;
use crate::constants::CostConstants;
use crate::workflow::Stage;

/// Current schema version for saved sessions
pub const SCHEMA_VERSION: &str = "0.1.0";

/// One costing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub meta: SessionMetadata,

    /// Constants used for every costing in this session
    pub constants: CostConstants,

    /// Constants the session was started with; declining to edit restores them
    #[serde(default)]
    pub base_constants: CostConstants,

    /// Where the workflow stands
    pub stage: Stage,

    /// Roller variant chosen at `SelectRoller`
    pub selected_variant: Option<RollerVariant>,

    /// Last roller costed; frames are priced against it
    pub last_roller: Option<RollerCostingRecord>,

    /// Committed lines
    pub results: ResultAccumulator,
}

impl Session {
    /// Start a session at the baseline constants.
    pub fn new() -> Self {
        Self::with_constants(CostConstants::default())
    }

    /// Start a session with preloaded constants.
    pub fn with_constants(constants: CostConstants) -> Self {
        let now = Utc::now();
        Session {
            meta: SessionMetadata {
                id: Uuid::new_v4(),
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            constants,
            base_constants: constants,
            stage: Stage::SelectRoller,
            selected_variant: None,
            last_roller: None,
            results: ResultAccumulator::new(),
        }
    }

    /// Commit a roller line and make it the roller frames are priced against.
    pub fn record_roller(&mut self, record: RollerCostingRecord) {
        self.last_roller = Some(record.clone());
        self.results.push_roller(record);
        self.touch();
    }

    /// Commit a frame line.
    pub fn record_frame(&mut self, record: FrameCostingRecord) {
        self.results.push_frame(record);
        self.touch();
    }

    /// Whether the last roller can be put on a frame
    pub fn can_add_frame(&self) -> bool {
        self.last_roller
            .as_ref()
            .is_some_and(|r| r.variant.supports_frame())
    }

    /// Drop every committed line and go back to roller selection.
    ///
    /// Constants stay as they are.
    pub fn reset(&mut self) {
        self.results.clear();
        self.stage = Stage::SelectRoller;
        self.selected_variant = None;
        self.last_roller = None;
        self.touch();
        tracing::info!(session = %self.meta.id, "session reset");
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Session identity and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: Uuid,

    /// Schema version (for migration compatibility)
    pub version: String,

    /// When the session was started
    pub created: DateTime<Utc>,

    /// When a line was last committed
    pub modified: DateTime<Utc>,
}
