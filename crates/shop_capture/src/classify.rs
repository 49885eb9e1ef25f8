use std::sync::OnceLock;

use regex::Regex;

/// One chat line, classified against the shop readout patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopLine {
    Header,
    Owner(String),
    Stock(i32),
    Item(String),
    Buy { quantity: i32, price: i32 },
    Sell { quantity: i32, price: i32 },
    Unmatched,
}

struct ShopPatterns {
    header: Regex,
    owner: Regex,
    stock: Regex,
    item: Regex,
    buy: Regex,
    sell: Regex,
    formatting: Regex,
}

fn patterns() -> &'static ShopPatterns {
    static PATTERNS: OnceLock<ShopPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ShopPatterns {
        header: compile(r"^(?i-u:Shop Information:)$"),
        owner: compile(r"^(?i-u:Owner: )(.*)$"),
        stock: compile(r"^(?i-u:Stock: )([0-9]+)$"),
        item: compile(r"^(?i-u:Item: )\[(.*)\]$"),
        buy: compile(r"^(?i-u:Buy )([0-9]+)(?i-u: for )([0-9]+)(?i-u: Coins)$"),
        sell: compile(r"^(?i-u:Sell )([0-9]+)(?i-u: for )([0-9]+)(?i-u: Coins)$"),
        formatting: compile(r"\x{00A7}(?i-u:[0-9A-FK-OR])"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("shop patterns are valid regexes")
}

/// Removes section-sign formatting codes (`§a`, `§l`, `§r`, ...) from `text`.
pub fn strip_formatting(text: &str) -> String {
    patterns().formatting.replace_all(text, "").into_owned()
}

/// Strips formatting and surrounding whitespace from a raw chat line.
pub fn clean_line(raw: &str) -> String {
    strip_formatting(raw).trim().to_string()
}

/// Classifies a line that has already been cleaned with [`clean_line`].
///
/// Patterns are anchored and mutually exclusive, so the first match wins.
/// Case folding covers ASCII letters only.
/// Digit groups that do not fit an `i32` classify as [`ShopLine::Unmatched`].
pub fn classify(line: &str) -> ShopLine {
    let p = patterns();

    if p.header.is_match(line) {
        return ShopLine::Header;
    }
    if let Some(caps) = p.owner.captures(line) {
        return ShopLine::Owner(caps[1].trim().to_string());
    }
    if let Some(caps) = p.stock.captures(line) {
        return caps[1]
            .parse()
            .map(ShopLine::Stock)
            .unwrap_or(ShopLine::Unmatched);
    }
    if let Some(caps) = p.item.captures(line) {
        return ShopLine::Item(caps[1].trim().to_string());
    }
    if let Some(caps) = p.buy.captures(line) {
        return match (caps[1].parse(), caps[2].parse()) {
            (Ok(quantity), Ok(price)) => ShopLine::Buy { quantity, price },
            _ => ShopLine::Unmatched,
        };
    }
    if let Some(caps) = p.sell.captures(line) {
        return match (caps[1].parse(), caps[2].parse()) {
            (Ok(quantity), Ok(price)) => ShopLine::Sell { quantity, price },
            _ => ShopLine::Unmatched,
        };
    }
    ShopLine::Unmatched
}

/// Cleans and classifies a raw chat line in one step.
pub fn classify_raw(raw: &str) -> ShopLine {
    classify(&clean_line(raw))
}
