//! In-game clock and opening hours.

use serde::{Deserialize, Serialize};

use crate::constants::{CLOSE_HOUR, MINUTES_PER_SECOND, OPEN_HOUR, START_HOUR};

/// Game clock: day of week, hour and minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameClock {
    pub day: u32,
    pub hours: u32,
    pub minutes: f32,
    /// Game minutes per real second.
    pub minutes_per_second: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            day: 0,
            hours: START_HOUR,
            minutes: 0.0,
            minutes_per_second: MINUTES_PER_SECOND,
        }
    }
}

impl GameClock {
    pub fn at(day: u32, hours: u32, minutes: f32) -> Self {
        Self {
            day: day % 7,
            hours: hours % 24,
            minutes,
            ..Default::default()
        }
    }

    /// Advance by `dt` real seconds.
    pub fn advance(&mut self, dt: f32) {
        self.minutes += dt * self.minutes_per_second;
        while self.minutes >= 60.0 {
            self.minutes -= 60.0;
            self.hours += 1;
        }
        while self.hours >= 24 {
            self.hours -= 24;
            self.day = (self.day + 1) % 7;
        }
    }

    /// Fractional hour of day in `[0, 24)`.
    pub fn hour_of_day(&self) -> f32 {
        self.hours as f32 + self.minutes / 60.0
    }

    /// Jump to the morning of the next day.
    pub fn advance_to_next_day(&mut self) {
        self.day = (self.day + 1) % 7;
        self.hours = START_HOUR;
        self.minutes = 0.0;
    }

    pub fn time_string(&self) -> String {
        format!("{:02}:{:02}", self.hours, self.minutes as u32)
    }
}

/// Half-open `[open, close)` window of whole hours. A window with
/// `open > close` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub open: u32,
    pub close: u32,
}

impl Default for OpenHours {
    fn default() -> Self {
        Self {
            open: OPEN_HOUR,
            close: CLOSE_HOUR,
        }
    }
}

impl OpenHours {
    pub fn contains(&self, hour: u32) -> bool {
        let hour = hour % 24;
        if self.open <= self.close {
            hour >= self.open && hour < self.close
        } else {
            hour >= self.open || hour < self.close
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_roll_into_hours() {
        let mut clock = GameClock::at(0, 8, 59.0);
        clock.advance(2.0);
        assert_eq!(clock.hours, 9);
        assert!((clock.minutes - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_day_wraps() {
        let mut clock = GameClock::at(6, 23, 30.0);
        clock.advance(60.0);
        assert_eq!(clock.hours, 0);
        assert_eq!(clock.day, 0);
    }

    #[test]
    fn test_time_scale() {
        let mut clock = GameClock::at(0, 8, 0.0);
        clock.minutes_per_second = 10.0;
        clock.advance(6.0);
        assert_eq!(clock.hours, 9);
        assert_eq!(clock.time_string(), "09:00");
    }

    #[test]
    fn test_open_hours() {
        let hours = OpenHours::default();
        assert!(!hours.contains(7));
        assert!(hours.contains(8));
        assert!(hours.contains(21));
        assert!(!hours.contains(22));

        let night = OpenHours { open: 20, close: 4 };
        assert!(night.contains(23));
        assert!(night.contains(2));
        assert!(!night.contains(12));
    }
}
