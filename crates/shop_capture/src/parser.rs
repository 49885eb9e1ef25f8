use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::classify::{classify, ShopLine};
use crate::record::{BlockPos, ShopRecord};

/// Host-supplied context sampled for each incoming line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LineContext {
    pub position: BlockPos,
    pub observed_at: NaiveDateTime,
}

impl LineContext {
    pub fn new(position: BlockPos, observed_at: NaiveDateTime) -> Self {
        Self {
            position,
            observed_at,
        }
    }

    /// Context stamped with the local wall clock.
    pub fn now(position: BlockPos) -> Self {
        Self::new(position, Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum ParserState {
    #[default]
    Idle,
    Capturing(ShopRecord),
}

/// Streaming state machine over classified chat lines.
///
/// Shop readouts have no end marker: a record closes on the first line that
/// breaks the pattern, or when the next header arrives. Closed records that
/// pass [`ShopRecord::is_valid`] are handed back to the caller for
/// finalization; the rest are dropped.
#[derive(Debug, Clone, Default)]
pub struct ShopParser {
    state: ParserState,
}

impl ShopParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, ParserState::Capturing(_))
    }

    pub fn current(&self) -> Option<&ShopRecord> {
        match &self.state {
            ParserState::Capturing(record) => Some(record),
            ParserState::Idle => None,
        }
    }

    /// Feeds one cleaned line and returns a record that is ready to finalize.
    pub fn feed(&mut self, line: &str, ctx: &LineContext) -> Option<ShopRecord> {
        match classify(line) {
            ShopLine::Unmatched if self.is_capturing() => {
                debug!(line, "line did not match a shop pattern, finalizing");
                self.finish()
            }
            classified => self.advance(classified, ctx),
        }
    }

    /// Applies an already classified line.
    pub fn advance(&mut self, line: ShopLine, ctx: &LineContext) -> Option<ShopRecord> {
        match line {
            ShopLine::Header => self.start(ctx),
            ShopLine::Unmatched => self.finish(),
            update => {
                if let ParserState::Capturing(record) = &mut self.state {
                    record.apply(&update);
                    debug!(?update, "parsed shop line");
                }
                None
            }
        }
    }

    /// Closes the in-progress record, if any, and returns to idle.
    pub fn finish(&mut self) -> Option<ShopRecord> {
        match std::mem::take(&mut self.state) {
            ParserState::Capturing(record) if record.is_valid() => Some(record),
            ParserState::Capturing(_) => {
                debug!("shop data was not valid, discarding");
                None
            }
            ParserState::Idle => None,
        }
    }

    fn start(&mut self, ctx: &LineContext) -> Option<ShopRecord> {
        let fresh = ParserState::Capturing(ShopRecord::new(ctx.observed_at, ctx.position));
        let previous = std::mem::replace(&mut self.state, fresh);
        debug!(position = %ctx.position, "detected shop header, starting capture");
        match previous {
            ParserState::Capturing(record) if record.is_valid() => {
                debug!("new shop header while capturing, closing previous shop");
                Some(record)
            }
            ParserState::Capturing(_) => {
                debug!("new shop header replaced an empty capture");
                None
            }
            ParserState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ctx(x: i32) -> LineContext {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        LineContext::new(BlockPos::new(x, 64, -x), at)
    }

    #[test]
    fn idle_parser_ignores_non_header_lines() {
        let mut parser = ShopParser::new();
        for line in ["hello", "Owner: Bob", "Stock: 4", "Buy 1 for 2 Coins", ""] {
            assert_eq!(parser.feed(line, &ctx(0)), None);
            assert_eq!(parser.state(), &ParserState::Idle);
        }
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn header_captures_position_and_time() {
        let mut parser = ShopParser::new();
        assert_eq!(parser.feed("Shop Information:", &ctx(7)), None);
        let current = parser.current().unwrap();
        assert_eq!(current.position, BlockPos::new(7, 64, -7));
        assert_eq!(current.captured_at, ctx(7).observed_at);
        assert!(!current.is_valid());
    }

    #[test]
    fn unmatched_line_finalizes_valid_record() {
        let mut parser = ShopParser::new();
        parser.feed("Shop Information:", &ctx(1));
        parser.feed("Owner: Bob", &ctx(2));
        parser.feed("Sell 1 for 8 Coins", &ctx(2));

        let record = parser.feed("<Bob> hi", &ctx(3)).expect("finalized");
        assert_eq!(record.owner, "Bob");
        assert_eq!((record.sell_quantity, record.sell_price), (1, 8));
        assert_eq!(record.position, BlockPos::new(1, 64, -1));
        assert!(!parser.is_capturing());
    }

    #[test]
    fn unmatched_line_discards_invalid_record() {
        let mut parser = ShopParser::new();
        parser.feed("Shop Information:", &ctx(1));
        parser.feed("Buy 1 for 10 Coins", &ctx(1));
        assert_eq!(parser.feed("unrelated", &ctx(1)), None);
        assert_eq!(parser.state(), &ParserState::Idle);
    }

    #[test]
    fn second_header_closes_valid_record_and_restarts() {
        let mut parser = ShopParser::new();
        parser.feed("Shop Information:", &ctx(1));
        parser.feed("Item: [Diamond]", &ctx(1));

        let previous = parser.feed("Shop Information:", &ctx(2)).expect("closed");
        assert_eq!(previous.item, "Diamond");
        assert_eq!(previous.position, BlockPos::new(1, 64, -1));

        let current = parser.current().unwrap();
        assert_eq!(current.position, BlockPos::new(2, 64, -2));
        assert_eq!(current.item, "N/A");
    }

    #[test]
    fn second_header_drops_invalid_record() {
        let mut parser = ShopParser::new();
        parser.feed("Shop Information:", &ctx(1));
        assert_eq!(parser.feed("Shop Information:", &ctx(2)), None);
        assert_eq!(
            parser.current().map(|r| r.position),
            Some(BlockPos::new(2, 64, -2))
        );
    }

    #[test]
    fn later_field_lines_overwrite_earlier_ones() {
        let mut parser = ShopParser::new();
        parser.feed("Shop Information:", &ctx(1));
        parser.feed("Stock: 1", &ctx(1));
        parser.feed("Stock: 9", &ctx(1));
        assert_eq!(parser.finish().map(|r| r.stock), Some(9));
    }
}
