use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::classify::ShopLine;

/// Placeholder for text fields that were never observed.
pub const UNSET_TEXT: &str = "N/A";
/// Placeholder for numeric fields that were never observed.
pub const UNSET_NUMBER: i32 = -1;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Integer block coordinates of the observer.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ParseBlockPosError {
    #[error("expected three comma-separated coordinates, got {0}")]
    Arity(usize),
    #[error("invalid coordinate: {0}")]
    Coordinate(#[from] ParseIntError),
}

impl FromStr for BlockPos {
    type Err = ParseBlockPosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(ParseBlockPosError::Arity(parts.len()));
        };
        Ok(Self::new(x.parse()?, y.parse()?, z.parse()?))
    }
}

/// One shop observation, accumulated line by line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShopRecord {
    pub captured_at: NaiveDateTime,
    pub position: BlockPos,
    pub owner: String,
    pub stock: i32,
    pub item: String,
    pub buy_quantity: i32,
    pub buy_price: i32,
    pub sell_quantity: i32,
    pub sell_price: i32,
    pub claim: String,
}

impl ShopRecord {
    pub fn new(captured_at: NaiveDateTime, position: BlockPos) -> Self {
        Self {
            captured_at,
            position,
            owner: UNSET_TEXT.to_string(),
            stock: UNSET_NUMBER,
            item: UNSET_TEXT.to_string(),
            buy_quantity: UNSET_NUMBER,
            buy_price: UNSET_NUMBER,
            sell_quantity: UNSET_NUMBER,
            sell_price: UNSET_NUMBER,
            claim: UNSET_TEXT.to_string(),
        }
    }

    /// A record is worth keeping once an owner, an item or a stock count was seen.
    pub fn is_valid(&self) -> bool {
        self.owner != UNSET_TEXT || self.item != UNSET_TEXT || self.stock != UNSET_NUMBER
    }

    /// Applies a field update. Returns `false` for lines that carry no field.
    pub fn apply(&mut self, line: &ShopLine) -> bool {
        match line {
            ShopLine::Owner(owner) => self.owner = owner.clone(),
            ShopLine::Stock(stock) => self.stock = *stock,
            ShopLine::Item(item) => self.item = item.clone(),
            ShopLine::Buy { quantity, price } => {
                self.buy_quantity = *quantity;
                self.buy_price = *price;
            }
            ShopLine::Sell { quantity, price } => {
                self.sell_quantity = *quantity;
                self.sell_price = *price;
            }
            ShopLine::Header | ShopLine::Unmatched => return false,
        }
        true
    }

    /// Renders the fixed single-line log format.
    pub fn to_log_line(&self) -> String {
        format!(
            "SHOP | Timestamp: {} | PlayerPos: {} | Owner: {} | Stock: {} | Item: {} | Buy: {} for {} | Sell: {} for {} | Claim: {}",
            self.captured_at.format(TIMESTAMP_FORMAT),
            self.position,
            self.owner,
            self.stock,
            self.item,
            self.buy_quantity,
            self.buy_price,
            self.sell_quantity,
            self.sell_price,
            self.claim,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn untouched_record_is_invalid() {
        let record = ShopRecord::new(at(), BlockPos::default());
        assert!(!record.is_valid());
    }

    #[test]
    fn any_substantive_field_makes_record_valid() {
        let mut stock_only = ShopRecord::new(at(), BlockPos::default());
        assert!(stock_only.apply(&ShopLine::Stock(0)));
        assert!(stock_only.is_valid());

        let mut prices_only = ShopRecord::new(at(), BlockPos::default());
        prices_only.apply(&ShopLine::Buy {
            quantity: 1,
            price: 2,
        });
        assert!(!prices_only.is_valid());
        assert!(!prices_only.apply(&ShopLine::Unmatched));
    }

    #[test]
    fn log_line_matches_fixed_format() {
        let mut record = ShopRecord::new(at(), BlockPos::new(-120, 64, 33));
        record.apply(&ShopLine::Owner("Bob".to_string()));
        record.apply(&ShopLine::Stock(5));
        record.apply(&ShopLine::Item("Diamond".to_string()));
        record.apply(&ShopLine::Buy {
            quantity: 1,
            price: 10,
        });
        record.apply(&ShopLine::Sell {
            quantity: 1,
            price: 8,
        });
        record.claim = "Spawn".to_string();

        assert_eq!(
            record.to_log_line(),
            "SHOP | Timestamp: 2025-03-09 14:05:07 | PlayerPos: -120,64,33 | Owner: Bob | Stock: 5 | Item: Diamond | Buy: 1 for 10 | Sell: 1 for 8 | Claim: Spawn"
        );
    }

    #[test]
    fn unset_fields_render_placeholders() {
        let mut record = ShopRecord::new(at(), BlockPos::default());
        record.apply(&ShopLine::Owner("Alice".to_string()));
        assert_eq!(
            record.to_log_line(),
            "SHOP | Timestamp: 2025-03-09 14:05:07 | PlayerPos: 0,0,0 | Owner: Alice | Stock: -1 | Item: N/A | Buy: -1 for -1 | Sell: -1 for -1 | Claim: N/A"
        );
    }

    #[test]
    fn block_pos_parses_from_cli_form() {
        assert_eq!("1, -2,3".parse(), Ok(BlockPos::new(1, -2, 3)));
        assert_eq!(
            "1,2".parse::<BlockPos>(),
            Err(ParseBlockPosError::Arity(2))
        );
        assert!(matches!(
            "1,x,3".parse::<BlockPos>(),
            Err(ParseBlockPosError::Coordinate(_))
        ));
    }
}
