use regex::Regex;
use std::sync::LazyLock;

/// Weight of the top heading level
pub const TOP_LEVEL_WEIGHT: i64 = 100;

/// Weight lost per heading depth
pub const WEIGHT_STEP: i64 = 10;

#[allow(clippy::expect_used)]
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^lvl(\d+)").expect("valid regex"));

/// Heading depth `N` of a `lvlN` level name
///
/// The name only needs to start with `lvl` and digits, so `lvl2_title` has
/// depth 2. Depths too large to represent are treated as no depth.
pub fn level_depth(level: &str) -> Option<u32> {
    LEVEL_RE.captures(level)?.get(1)?.as_str().parse().ok()
}

/// Ranking weight of a level name
///
/// `lvlN` weighs `100 - 10 * N`, so deeper headings rank lower and may go
/// negative past `lvl10`. Every other name weighs 0.
pub fn level_weight(level: &str) -> i64 {
    level_depth(level).map_or(0, |depth| TOP_LEVEL_WEIGHT - WEIGHT_STEP * i64::from(depth))
}
