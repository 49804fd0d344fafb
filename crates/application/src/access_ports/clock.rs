use chrono::NaiveDate;

/// Source of the current calendar date.
///
/// Production reads the system clock; tests pin a fixed date.
pub trait Clock: Send + Sync {
    /// Returns today's date.
    fn today(&self) -> NaiveDate;
}
