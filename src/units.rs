//! Human-readable simulated time.

use std::fmt::Display;

use float_pretty_print::PrettyPrintFloat;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Years,
}

const SECOND: f64 = 1.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const YEAR: f64 = 365.25 * DAY;

impl TimeUnit {
    pub const fn get_value(self) -> f64 {
        match self {
            TimeUnit::Seconds => SECOND,
            TimeUnit::Minutes => MINUTE,
            TimeUnit::Hours => HOUR,
            TimeUnit::Days => DAY,
            TimeUnit::Years => YEAR,
        }
    }

    pub const fn get_next_smaller(self) -> Option<Self> {
        match self {
            TimeUnit::Seconds => None,
            TimeUnit::Minutes => Some(TimeUnit::Seconds),
            TimeUnit::Hours => Some(TimeUnit::Minutes),
            TimeUnit::Days => Some(TimeUnit::Hours),
            TimeUnit::Years => Some(TimeUnit::Days),
        }
    }

    pub fn largest_unit_from_base(base: f64) -> Self {
        TimeUnit::iter()
            .rev()
            .find(|unit| base.abs() >= unit.get_value())
            .unwrap_or(TimeUnit::Seconds)
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
            TimeUnit::Years => "y",
        };
        f.write_str(text)
    }
}

/// Formats a duration with its two largest units, e.g. `14 y, 211 d`.
pub fn format_duration(mut seconds: f64) -> String {
    if !seconds.is_finite() {
        return format!("{seconds} {}", TimeUnit::Seconds);
    }

    let mut string = String::new();
    if seconds.is_sign_negative() && seconds != 0.0 {
        string.push('−');
        seconds = seconds.abs();
    }

    let largest = TimeUnit::largest_unit_from_base(seconds);
    let units = [Some(largest), largest.get_next_smaller()];

    for (idx, unit) in units.into_iter().flatten().enumerate() {
        let unit_value = unit.get_value();
        let (quo, rem) = ((seconds / unit_value).trunc(), seconds % unit_value);

        if idx > 0 {
            string.push_str(", ");
        }
        if quo < 1000.0 {
            string += &format!("{quo} {unit}");
        } else {
            let amount = PrettyPrintFloat(quo);
            string += &format!("{amount:5.3} {unit}");
        }

        seconds = rem;
    }

    string
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_unit() {
        assert_eq!(TimeUnit::largest_unit_from_base(0.5), TimeUnit::Seconds);
        assert_eq!(TimeUnit::largest_unit_from_base(90.0), TimeUnit::Minutes);
        assert_eq!(TimeUnit::largest_unit_from_base(-2.0 * DAY), TimeUnit::Days);
        assert_eq!(TimeUnit::largest_unit_from_base(1e10), TimeUnit::Years);
    }

    #[test]
    fn formats_two_units() {
        assert_eq!(format_duration(0.0), "0 s");
        assert_eq!(format_duration(90.0), "1 min, 30 s");
        assert_eq!(format_duration(3.0 * DAY + 5.0 * HOUR), "3 d, 5 h");
        assert_eq!(format_duration(-DAY), "−1 d, 0 h");
    }
}
