//! Weekdays a class may meet on.
//!
//! Sunday is excluded by policy. The 1-6 numbering (Monday = 1) is a
//! boundary concern: it is used when parsing submitted day lists and when
//! mapping the `class_schedules.day` column, never by reconciliation logic.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A teaching day, Monday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Every schedulable day in calendar order.
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Map the stable integer value (1 = Monday .. 6 = Saturday) to a day.
    pub fn from_number(number: i16) -> Option<Self> {
        match number {
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            _ => None,
        }
    }

    /// The stable integer value stored in the database.
    pub fn number(self) -> i16 {
        match self {
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated list of day numbers into a set of weekdays.
///
/// Tokens that are not integers in `1..=6` are dropped silently and
/// duplicates collapse, so `"1,1,7,abc,3"` yields `{Monday, Wednesday}`.
pub fn parse_day_set(csv: &str) -> BTreeSet<Weekday> {
    csv.split(',')
        .filter_map(|token| token.trim().parse::<i16>().ok())
        .filter_map(Weekday::from_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Number mapping
    // -----------------------------------------------------------------------

    #[test]
    fn number_mapping_is_stable() {
        for (index, day) in Weekday::ALL.iter().enumerate() {
            assert_eq!(day.number(), index as i16 + 1);
            assert_eq!(Weekday::from_number(day.number()), Some(*day));
        }
    }

    #[test]
    fn sunday_and_out_of_range_numbers_are_rejected() {
        assert_eq!(Weekday::from_number(0), None);
        assert_eq!(Weekday::from_number(7), None);
        assert_eq!(Weekday::from_number(-1), None);
    }

    #[test]
    fn days_order_by_calendar() {
        assert!(Weekday::Monday < Weekday::Saturday);
        assert!(Weekday::Wednesday < Weekday::Friday);
    }

    // -----------------------------------------------------------------------
    // parse_day_set
    // -----------------------------------------------------------------------

    #[test]
    fn drops_invalid_tokens_and_collapses_duplicates() {
        let days = parse_day_set("1,1,7,abc,3");
        assert_eq!(
            days.into_iter().collect::<Vec<_>>(),
            vec![Weekday::Monday, Weekday::Wednesday]
        );
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let days = parse_day_set(" 2 , 4,6 ");
        assert_eq!(
            days.into_iter().collect::<Vec<_>>(),
            vec![Weekday::Tuesday, Weekday::Thursday, Weekday::Saturday]
        );
    }

    #[test]
    fn empty_and_garbage_inputs_yield_empty_set() {
        assert!(parse_day_set("").is_empty());
        assert!(parse_day_set(",,,").is_empty());
        assert!(parse_day_set("0,7,x,1.5").is_empty());
    }

    #[test]
    fn display_uses_day_name() {
        assert_eq!(Weekday::Friday.to_string(), "Friday");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Weekday::Monday).unwrap();
        assert_eq!(json, "\"monday\"");
    }
}
