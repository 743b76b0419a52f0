/// Inclusive range over raw device units. An absent bound is unconstrained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ValueRange {
    #[must_use]
    pub const fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn between(min: i64, max: i64) -> Self {
        Self::new(Some(min), Some(max))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|m| value >= m) && self.max.is_none_or(|m| value <= m)
    }
}
