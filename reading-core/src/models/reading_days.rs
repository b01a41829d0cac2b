use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Every weekday, Monday first.
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday ("Monday", ...).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The weekdays on which the reader plans to read.
///
/// Each day is toggled independently; only membership matters. Serialises as
/// a `{"Monday": true, "Tuesday": false, ...}` map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReadingDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl ReadingDays {
    /// Build a set from the given weekdays. Duplicates are harmless.
    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut set = Self::default();
        for day in days {
            set.set(day, true);
        }
        set
    }

    pub fn is_active(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(
        &mut self,
        day: Weekday,
        active: bool,
    ) {
        *self.slot(day) = active;
    }

    pub fn toggle(&mut self, day: Weekday) {
        let slot = self.slot(day);
        *slot = !*slot;
    }

    /// True when at least one weekday is active.
    pub fn any(&self) -> bool {
        self.count() > 0
    }

    /// Number of active weekdays (0..=7).
    pub fn count(&self) -> u32 {
        ALL_WEEKDAYS.iter().filter(|d| self.is_active(**d)).count() as u32
    }

    /// Active weekdays in Monday-first order.
    pub fn active(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.into_iter().filter(|d| self.is_active(*d))
    }

    /// Compact storage form: bit 0 is Monday, bit 6 is Sunday.
    pub fn to_bits(&self) -> u8 {
        self.active()
            .fold(0, |bits, day| bits | (1 << day.num_days_from_monday()))
    }

    /// Inverse of [`ReadingDays::to_bits`]. Bit 7 is ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self::from_weekdays(
            ALL_WEEKDAYS
                .into_iter()
                .filter(|d| bits & (1 << d.num_days_from_monday()) != 0),
        )
    }

    fn slot(&mut self, day: Weekday) -> &mut bool {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }
}

impl fmt::Display for ReadingDays {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if !self.any() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.active().map(|d| &weekday_name(d)[..3]).collect();
        write!(f, "{}", names.join(", "))
    }
}
