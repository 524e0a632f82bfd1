use std::str::FromStr;

use chrono::NaiveTime;
use registrar_core::offering::DEFAULT_MAX_CODE_ATTEMPTS;
use registrar_core::schedule::{parse_time_of_day, ScheduleWindow, CLEAR_ON_INCOMPLETE_INPUT};

/// Offering service configuration loaded from environment variables.
///
/// All fields have defaults matching the registrar's standing policy.
#[derive(Debug, Clone)]
pub struct OfferingConfig {
    /// Uniqueness probes before code generation fails (default: `50`).
    pub code_max_attempts: u32,
    /// Whether incomplete schedule input on update clears stored rows
    /// (default: `true`).
    pub clear_on_incomplete_input: bool,
    /// Allowed class times (default: `07:30`-`21:30`).
    pub window: ScheduleWindow,
}

impl Default for OfferingConfig {
    fn default() -> Self {
        Self {
            code_max_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            clear_on_incomplete_input: CLEAR_ON_INCOMPLETE_INPUT,
            window: ScheduleWindow::default(),
        }
    }
}

impl OfferingConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `OFFERING_CODE_MAX_ATTEMPTS`   | `50`    |
    /// | `SCHEDULE_CLEAR_ON_INCOMPLETE` | `true`  |
    /// | `SCHEDULE_WINDOW_START`        | `07:30` |
    /// | `SCHEDULE_WINDOW_END`          | `21:30` |
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let code_max_attempts = parse_or(
            &lookup,
            "OFFERING_CODE_MAX_ATTEMPTS",
            defaults.code_max_attempts,
        )
        .max(1);
        let clear_on_incomplete_input = parse_or(
            &lookup,
            "SCHEDULE_CLEAR_ON_INCOMPLETE",
            defaults.clear_on_incomplete_input,
        );
        let earliest = time_or(&lookup, "SCHEDULE_WINDOW_START", defaults.window.earliest);
        let latest = time_or(&lookup, "SCHEDULE_WINDOW_END", defaults.window.latest);

        let window = if earliest < latest {
            ScheduleWindow { earliest, latest }
        } else {
            tracing::warn!(
                %earliest,
                %latest,
                "Schedule window start is not before its end, using default window"
            );
            defaults.window
        };

        Self {
            code_max_attempts,
            clear_on_incomplete_input,
            window,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Invalid config value, using default");
            default
        }),
    }
}

fn time_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: NaiveTime,
) -> NaiveTime {
    match lookup(key) {
        None => default,
        Some(raw) => parse_time_of_day(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, %default, "Invalid config time, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = OfferingConfig::from_lookup(lookup(&[]));
        assert_eq!(config.code_max_attempts, 50);
        assert!(config.clear_on_incomplete_input);
        assert_eq!(config.window, ScheduleWindow::default());
    }

    #[test]
    fn reads_overrides() {
        let config = OfferingConfig::from_lookup(lookup(&[
            ("OFFERING_CODE_MAX_ATTEMPTS", "5"),
            ("SCHEDULE_CLEAR_ON_INCOMPLETE", "false"),
            ("SCHEDULE_WINDOW_START", "08:00"),
            ("SCHEDULE_WINDOW_END", "20:00"),
        ]));
        assert_eq!(config.code_max_attempts, 5);
        assert!(!config.clear_on_incomplete_input);
        assert_eq!(config.window.earliest, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(config.window.latest, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = OfferingConfig::from_lookup(lookup(&[
            ("OFFERING_CODE_MAX_ATTEMPTS", "many"),
            ("SCHEDULE_CLEAR_ON_INCOMPLETE", "sometimes"),
            ("SCHEDULE_WINDOW_START", "dawn"),
        ]));
        assert_eq!(config.code_max_attempts, 50);
        assert!(config.clear_on_incomplete_input);
        assert_eq!(config.window, ScheduleWindow::default());
    }

    #[test]
    fn inverted_window_falls_back_to_default() {
        let config = OfferingConfig::from_lookup(lookup(&[
            ("SCHEDULE_WINDOW_START", "20:00"),
            ("SCHEDULE_WINDOW_END", "08:00"),
        ]));
        assert_eq!(config.window, ScheduleWindow::default());
    }
}
