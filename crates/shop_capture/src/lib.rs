#![forbid(unsafe_code)]
//! Incremental capture of shop sign readouts from a chat line stream.
//!
//! Lines arrive one at a time with no explicit record delimiter. A
//! `Shop Information:` header opens a record, recognized field lines fill it,
//! and the first unrecognized line (or the next header) closes it. Closed
//! records are enriched with the claim shown on the host's sidebar, appended
//! to a durable log, and every `threshold` records an external analysis runs
//! in the background.
//!
//! The host owns chat delivery, player position, the sidebar and rendering.
//! This crate talks to it through [`LineContext`], [`SidebarSource`] and
//! [`EventSink`].

mod analysis;
mod capture;
mod classify;
mod config;
mod error;
mod events;
mod ingest;
mod parser;
mod process;
mod reader;
mod record;
mod sidebar;
mod sink;

pub use analysis::{AnalysisOutcome, AnalysisRunner};
pub use capture::ShopCapture;
pub use classify::{classify, classify_raw, clean_line, strip_formatting, ShopLine};
pub use config::{
    CaptureConfig, ANALYSIS_COMMAND_ENV, DEFAULT_ANALYSIS_SCRIPT, DEFAULT_LOG_FILE,
    DEFAULT_LOG_LEVEL, DEFAULT_THRESHOLD,
};
pub use error::{AnalysisError, ConfigError, LineRecord, LineRecordError, ShopLogError};
pub use events::{CaptureEvent, EventSink};
pub use ingest::LineIngestor;
pub use parser::{LineContext, ParserState, ShopParser};
pub use record::{
    BlockPos, ParseBlockPosError, ShopRecord, TIMESTAMP_FORMAT, UNSET_NUMBER, UNSET_TEXT,
};
pub use sidebar::{
    claim_for_view, claim_from_lines, lookup_claim, ordered_lines, Claim, SidebarEntry,
    SidebarSource, SidebarView,
};
pub use sink::{ShopLog, Tracked, TrackingCounter};
