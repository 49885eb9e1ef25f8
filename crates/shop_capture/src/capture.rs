use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tracing::{debug, error};

use crate::analysis::AnalysisRunner;
use crate::classify::clean_line;
use crate::config::CaptureConfig;
use crate::events::{CaptureEvent, EventSink};
use crate::parser::{LineContext, ShopParser};
use crate::record::ShopRecord;
use crate::sidebar::{lookup_claim, SidebarSource};
use crate::sink::ShopLog;

struct CaptureState {
    parser: ShopParser,
    log: ShopLog,
}

/// Drives the whole pipeline for one chat stream: classify, accumulate,
/// enrich with the sidebar claim, persist, and kick off batch analysis.
///
/// Each line is handled to completion under a single lock, persistence
/// included, so lines delivered from several threads are serialized.
pub struct ShopCapture {
    state: Mutex<CaptureState>,
    sidebar: Box<dyn SidebarSource>,
    events: Arc<dyn EventSink>,
    analysis: AnalysisRunner,
}

impl ShopCapture {
    pub fn new(
        config: &CaptureConfig,
        sidebar: impl SidebarSource + 'static,
        events: impl EventSink,
    ) -> Self {
        Self {
            state: Mutex::new(CaptureState {
                parser: ShopParser::new(),
                log: ShopLog::new(config.log_path(), config.threshold),
            }),
            sidebar: Box::new(sidebar),
            events: Arc::new(events),
            analysis: AnalysisRunner::from_config(config),
        }
    }

    /// Runs background analysis on `handle` rather than the caller's runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.analysis = self.analysis.runtime(handle);
        self
    }

    fn lock(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Processes one raw chat line. Returns the record persisted as a result, if any.
    pub fn on_chat_line(&self, raw: &str, ctx: &LineContext) -> Option<ShopRecord> {
        let line = clean_line(raw);
        let mut state = self.lock();
        let ready = state.parser.feed(&line, ctx)?;
        self.finalize(&mut state, ready)
    }

    /// Closes any in-progress record, as when the stream ends.
    pub fn finish(&self) -> Option<ShopRecord> {
        let mut state = self.lock();
        let ready = state.parser.finish()?;
        self.finalize(&mut state, ready)
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().parser.is_capturing()
    }

    /// Records persisted since the last analysis batch.
    pub fn tracked(&self) -> u32 {
        self.lock().log.tracked()
    }

    fn finalize(&self, state: &mut CaptureState, mut record: ShopRecord) -> Option<ShopRecord> {
        record.claim = lookup_claim(self.sidebar.as_ref()).to_string();
        debug!(claim = %record.claim, "finalizing shop data");

        let tracked = match state.log.append(&record) {
            Ok(tracked) => tracked,
            Err(err) => {
                error!(error = %err, "failed to write shop log");
                return None;
            }
        };

        self.events.emit(CaptureEvent::RecordLogged {
            item: record.item.clone(),
            owner: record.owner.clone(),
            count: tracked.count,
            threshold: tracked.threshold,
        });

        if tracked.threshold_reached {
            self.events.emit(CaptureEvent::ThresholdReached {
                threshold: tracked.threshold,
            });
            self.analysis
                .trigger(state.log.path(), Arc::clone(&self.events));
        }

        Some(record)
    }
}
