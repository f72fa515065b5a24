//! Active Windows

use jiff::Timestamp;
use serde::Deserialize;

/// The period in which a discount may run.
///
/// A missing bound is unbounded. The start is inclusive and the end is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ActiveWindow {
    /// First instant the discount is live
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// First instant the discount is no longer live
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
}

impl ActiveWindow {
    /// Create a window from optional bounds.
    pub const fn new(starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        Self { starts_at, ends_at }
    }

    /// A window with no bounds.
    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// A window opening at `starts_at` with no end.
    pub const fn starting(starts_at: Timestamp) -> Self {
        Self::new(Some(starts_at), None)
    }

    /// A window closing at `ends_at` with no start.
    pub const fn ending(ends_at: Timestamp) -> Self {
        Self::new(None, Some(ends_at))
    }

    /// Whether `at` falls within the window.
    pub fn contains(&self, at: Timestamp) -> bool {
        let started = self.starts_at.is_none_or(|starts_at| starts_at <= at);
        let ended = self.ends_at.is_some_and(|ends_at| ends_at <= at);

        started && !ended
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn unbounded_contains_everything() -> TestResult {
        let window = ActiveWindow::unbounded();

        assert!(window.contains(Timestamp::UNIX_EPOCH));
        assert!(window.contains("2099-12-31T23:59:59Z".parse()?));

        Ok(())
    }

    #[test]
    fn start_is_inclusive() -> TestResult {
        let start: Timestamp = "2026-05-01T00:00:00Z".parse()?;
        let window = ActiveWindow::starting(start);

        assert!(window.contains(start));
        assert!(!window.contains("2026-04-30T23:59:59Z".parse()?));

        Ok(())
    }

    #[test]
    fn end_is_exclusive() -> TestResult {
        let end: Timestamp = "2026-05-01T00:00:00Z".parse()?;
        let window = ActiveWindow::ending(end);

        assert!(!window.contains(end));
        assert!(window.contains("2026-04-30T23:59:59Z".parse()?));

        Ok(())
    }

    #[test]
    fn deserializes_from_yaml() -> TestResult {
        let window: ActiveWindow = serde_norway::from_str("starts_at: \"2026-05-01T00:00:00Z\"")?;

        assert_eq!(window.starts_at, Some("2026-05-01T00:00:00Z".parse()?));
        assert_eq!(window.ends_at, None);

        Ok(())
    }
}
