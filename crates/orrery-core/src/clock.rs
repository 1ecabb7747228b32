//! Simulated clock for callers that animate the orrery. The core functions
//! never read it; they take a Julian Day explicitly.

use serde::{Deserialize, Serialize};

use crate::calendar::{calendar_date, julian_day, julian_day_from_unix_millis, CalendarDate};
use crate::error::{OrbitError, OrbitResult};

/// How far the simulated clock moves per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum TimeStep {
    Days(f64),
    /// Whole calendar months; the day of month is clamped when the target
    /// month is shorter.
    Months(i32),
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Days(1.0)
    }
}

impl TimeStep {
    /// Day steps must be finite. Any month count is fine.
    pub fn validate(&self) -> OrbitResult<()> {
        match *self {
            TimeStep::Days(days) if !days.is_finite() => Err(OrbitError::InvalidConfig {
                field: "timeStep",
                reason: "day step must be finite",
            }),
            _ => Ok(()),
        }
    }
}

/// Simulated time, stored as a continuous Julian Day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    julian_day: f64,
    step: TimeStep,
    paused: bool,
}

impl SimulationClock {
    pub fn new(julian_day: f64) -> Self {
        Self {
            julian_day,
            step: TimeStep::default(),
            paused: false,
        }
    }

    pub fn at_date(date: &CalendarDate) -> Self {
        Self::new(julian_day(date))
    }

    /// Start from a JavaScript-style wall clock reading.
    pub fn from_unix_millis(millis: f64) -> Self {
        Self::new(julian_day_from_unix_millis(millis))
    }

    /// Current simulated Julian Day.
    pub fn now(&self) -> f64 {
        self.julian_day
    }

    pub fn calendar_date(&self) -> CalendarDate {
        calendar_date(self.julian_day)
    }

    pub fn step(&self) -> TimeStep {
        self.step
    }

    pub fn set_step(&mut self, step: TimeStep) {
        self.step = step;
    }

    pub fn set_julian_day(&mut self, julian_day: f64) {
        self.julian_day = julian_day;
    }

    /// Advance one step. Returns `false` (and does nothing) while paused.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        match self.step {
            TimeStep::Days(days) => self.advance_days(days),
            TimeStep::Months(months) => self.advance_months(months),
        }
        true
    }

    pub fn advance_days(&mut self, days: f64) {
        self.julian_day += days;
    }

    pub fn advance_months(&mut self, months: i32) {
        let shifted = self.calendar_date().add_months(months);
        self.julian_day = julian_day(&shifted);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the pause state and return the new one.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Fixed timestep accumulator.
/// Turns variable frame deltas into a whole number of clock ticks.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimestep {
    /// Seconds of wall time per tick.
    dt: f32,
    /// Wall time not yet spent on a tick.
    accumulator: f32,
}

impl FixedTimestep {
    /// Most ticks a single frame may trigger.
    pub const MAX_STEPS_PER_FRAME: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of ticks to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // cap at MAX_STEPS_PER_FRAME ticks per frame
        self.accumulator = self.accumulator.min(self.dt * Self::MAX_STEPS_PER_FRAME as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::JD_J2000;

    #[test]
    fn day_step_advances_julian_day() {
        let mut clock = SimulationClock::new(JD_J2000);
        assert!(clock.tick());
        assert_eq!(clock.now(), JD_J2000 + 1.0);

        clock.set_step(TimeStep::Days(-0.5));
        clock.tick();
        assert_eq!(clock.now(), JD_J2000 + 0.5);
    }

    #[test]
    fn month_step_follows_calendar() {
        let mut clock = SimulationClock::at_date(&CalendarDate::ymd(2000, 1, 15));
        clock.set_step(TimeStep::Months(1));
        clock.tick();
        let date = clock.calendar_date();
        assert_eq!((date.year, date.month, date.day), (2000, 2, 15));

        clock.set_step(TimeStep::Months(11));
        clock.tick();
        let date = clock.calendar_date();
        assert_eq!((date.year, date.month, date.day), (2001, 1, 15));
    }

    #[test]
    fn month_step_clamps_day_and_keeps_time() {
        let mut clock = SimulationClock::at_date(&CalendarDate::ymd_hms(2001, 1, 31, 18, 0, 0.0));
        clock.advance_months(1);
        let date = clock.calendar_date();
        assert_eq!((date.year, date.month, date.day, date.hour), (2001, 2, 28, 18));
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = SimulationClock::new(JD_J2000);
        clock.pause();
        assert!(!clock.tick());
        assert_eq!(clock.now(), JD_J2000);

        assert!(!clock.toggle_pause());
        assert!(clock.tick());
        assert_eq!(clock.now(), JD_J2000 + 1.0);
    }

    #[test]
    fn starts_from_unix_millis() {
        let clock = SimulationClock::from_unix_millis(946_728_000_000.0);
        assert!((clock.now() - JD_J2000).abs() < 1e-9);
        assert!(!clock.is_paused());
    }

    #[test]
    fn non_finite_day_step_is_invalid() {
        assert!(TimeStep::Days(-2.5).validate().is_ok());
        assert!(TimeStep::Months(-12).validate().is_ok());
        assert!(TimeStep::Days(f64::NAN).validate().is_err());
        assert!(TimeStep::Days(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn time_step_serde_format() {
        let json = serde_json::to_string(&TimeStep::Months(2)).unwrap();
        assert_eq!(json, r#"{"unit":"months","amount":2}"#);
        let step: TimeStep = serde_json::from_str(r#"{"unit":"days","amount":0.25}"#).unwrap();
        assert_eq!(step, TimeStep::Days(0.25));
    }

    fn run_frame(clock: &mut SimulationClock, ts: &mut FixedTimestep, frame_dt: f32) {
        for _ in 0..ts.accumulate(frame_dt) {
            clock.tick();
        }
    }

    #[test]
    fn half_frames_add_up_to_one_day() {
        let mut clock = SimulationClock::new(JD_J2000);
        let mut ts = FixedTimestep::new(0.25);

        run_frame(&mut clock, &mut ts, 0.125);
        assert_eq!(clock.now(), JD_J2000);
        assert_eq!(ts.alpha(), 0.5);

        run_frame(&mut clock, &mut ts, 0.125);
        assert_eq!(clock.now(), JD_J2000 + 1.0);
        assert_eq!(ts.alpha(), 0.0);
    }

    #[test]
    fn long_frame_steps_several_months() {
        let mut clock = SimulationClock::at_date(&CalendarDate::ymd(2000, 11, 30));
        clock.set_step(TimeStep::Months(1));
        let mut ts = FixedTimestep::new(0.25);

        run_frame(&mut clock, &mut ts, 0.75);
        let date = clock.calendar_date();
        assert_eq!((date.year, date.month, date.day), (2001, 2, 28));
        assert_eq!(ts.alpha(), 0.0);
    }

    #[test]
    fn caps_steps_per_frame() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(5.0), FixedTimestep::MAX_STEPS_PER_FRAME);
    }

    #[test]
    fn negative_frame_time_is_ignored() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.alpha(), 0.0);
    }
}
