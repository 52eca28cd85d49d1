/*
 * This file is part of pwmfan.
 *
 * Copyright (C) 2025 pwmfan contributors
 *
 * pwmfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pwmfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pwmfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Normalized PWM fan
//!
//! Speaks fractions of full speed instead of raw duty cycles.
//!
//! # Mapping
//!
//! Writing `n` (clamped to 0.0-1.0):
//! - `raw = ceil(n * line_end)`
//! - a non-zero result below `line_start` is raised to `line_start`, since
//!   most fans stall below some duty cycle
//! - zero stays zero (fan stopped), or becomes `line_start` with `never_stop`
//! - NaN and infinities are rejected with `InvalidNormalized`
//!
//! Reading returns `raw / 255`, unclamped.

use std::path::{Path, PathBuf};

use super::{FanControl, PwmValue, PwmValueNorm, RawPwmFan, Rpm};
use crate::constants::pwm;
use crate::error::{PwmFanError, Result};
use crate::sysfs::{HostFs, SysfsIo};

/// PWM fan addressed in fractions of full speed
#[derive(Debug)]
pub struct NormalizedPwmFan<F: SysfsIo = HostFs> {
    raw: RawPwmFan<F>,
    line_start: PwmValue,
    line_end: PwmValue,
    never_stop: bool,
}

impl NormalizedPwmFan<HostFs> {
    /// Fan backed by the host filesystem
    ///
    /// # Arguments
    /// * `pwm` - Path to the PWM control file
    /// * `fan_input` - Path to the tachometer file
    /// * `line_start` - Lowest duty cycle at which the fan spins
    /// * `line_end` - Duty cycle written for a normalized speed of 1.0
    /// * `never_stop` - Idle at `line_start` instead of stopping at 0.0
    pub fn new(
        pwm: impl Into<PathBuf>,
        fan_input: impl Into<PathBuf>,
        line_start: PwmValue,
        line_end: PwmValue,
        never_stop: bool,
    ) -> Result<Self> {
        Self::from_raw(RawPwmFan::new(pwm, fan_input), line_start, line_end, never_stop)
    }
}

impl<F: SysfsIo> NormalizedPwmFan<F> {
    /// Wrap an existing raw fan
    ///
    /// Fails with `InvalidConfig` unless `0 <= line_start <= line_end <= 255`.
    pub fn from_raw(
        raw: RawPwmFan<F>,
        line_start: PwmValue,
        line_end: PwmValue,
        never_stop: bool,
    ) -> Result<Self> {
        validate_line(line_start, line_end)?;
        Ok(Self {
            raw,
            line_start,
            line_end,
            never_stop,
        })
    }

    pub fn line_start(&self) -> PwmValue {
        self.line_start
    }

    pub fn line_end(&self) -> PwmValue {
        self.line_end
    }

    pub fn never_stop(&self) -> bool {
        self.never_stop
    }

    /// The wrapped raw fan
    pub fn raw(&self) -> &RawPwmFan<F> {
        &self.raw
    }

    pub fn into_raw(self) -> RawPwmFan<F> {
        self.raw
    }

    /// Convert a normalized speed to the duty cycle that would be written.
    ///
    /// Fails with `InvalidNormalized` for NaN or infinite input.
    pub fn to_raw(&self, normalized: PwmValueNorm) -> Result<PwmValue> {
        if !normalized.is_finite() {
            return Err(PwmFanError::InvalidNormalized { value: normalized });
        }
        let normalized = normalized.clamp(0.0, 1.0);

        let mut raw = (normalized * f64::from(self.line_end)).ceil() as PwmValue;
        if raw > 0 && raw < self.line_start {
            raw = self.line_start;
        }
        if raw <= 0 && self.never_stop {
            raw = self.line_start;
        }
        Ok(raw.clamp(pwm::MIN_VALUE, pwm::MAX_VALUE))
    }

    /// Convert a hardware duty cycle to a normalized speed
    pub fn to_normalized(raw: PwmValue) -> PwmValueNorm {
        f64::from(raw) / f64::from(pwm::MAX_VALUE)
    }

    /// Read current speed as a fraction of full duty cycle
    pub fn get(&self) -> Result<PwmValueNorm> {
        self.raw.get().map(Self::to_normalized)
    }

    pub fn set(&mut self, normalized: PwmValueNorm) -> Result<()> {
        self.set_norm(normalized).map(|_| ())
    }

    /// Like [`NormalizedPwmFan::set`], returning the raw duty cycle written
    pub fn set_norm(&mut self, normalized: PwmValueNorm) -> Result<PwmValue> {
        let raw = self.to_raw(normalized)?;
        self.raw.set(raw)?;
        Ok(raw)
    }

    /// Full duty cycle (255), bypassing the mapping window
    pub fn set_full_speed(&mut self) -> Result<()> {
        self.raw.set_full_speed()
    }

    pub fn get_speed(&self) -> Result<Rpm> {
        self.raw.get_speed()
    }

    pub fn enter_control(&mut self) -> Result<()> {
        self.raw.enter_control()
    }

    pub fn exit_control(&mut self) -> Result<()> {
        self.raw.exit_control()
    }
}

/// Check a mapping window: both ends within 0-255 and `line_start <= line_end`
pub(crate) fn validate_line(line_start: PwmValue, line_end: PwmValue) -> Result<()> {
    let range = pwm::MIN_VALUE..=pwm::MAX_VALUE;
    if !range.contains(&line_start) {
        return Err(PwmFanError::invalid_config(
            "pwm_line_start",
            format!("{} is outside 0-255", line_start),
        ));
    }
    if !range.contains(&line_end) {
        return Err(PwmFanError::invalid_config(
            "pwm_line_end",
            format!("{} is outside 0-255", line_end),
        ));
    }
    if line_start > line_end {
        return Err(PwmFanError::invalid_config(
            "pwm_line_start",
            format!("{} is greater than pwm_line_end {}", line_start, line_end),
        ));
    }
    Ok(())
}

impl<F: SysfsIo> FanControl for NormalizedPwmFan<F> {
    type Value = PwmValueNorm;

    fn pwm_path(&self) -> &Path {
        self.raw.pwm_path()
    }

    fn get(&self) -> Result<PwmValueNorm> {
        NormalizedPwmFan::get(self)
    }

    fn set(&mut self, value: PwmValueNorm) -> Result<()> {
        NormalizedPwmFan::set(self, value)
    }

    fn set_full_speed(&mut self) -> Result<()> {
        NormalizedPwmFan::set_full_speed(self)
    }

    fn get_speed(&self) -> Result<Rpm> {
        NormalizedPwmFan::get_speed(self)
    }

    fn enter_control(&mut self) -> Result<()> {
        NormalizedPwmFan::enter_control(self)
    }

    fn exit_control(&mut self) -> Result<()> {
        NormalizedPwmFan::exit_control(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fan::with_control;
    use crate::test_utils::FanFiles;

    fn window(never_stop: bool) -> NormalizedPwmFan {
        NormalizedPwmFan::new("/hw/pwm2", "/hw/fan2_input", 100, 240, never_stop).unwrap()
    }

    #[test]
    fn test_get_set() {
        let files = FanFiles::new();
        let mut fan = files.normalized_fan(100, 240, false);

        fan.set(0.42).unwrap();
        assert_eq!(files.pwm(), "101");

        files.write_pwm("132\n");
        let got = fan.get().unwrap();
        assert!((got - 0.517).abs() / 0.517 < 0.01, "got {}", got);

        fan.set_full_speed().unwrap();
        assert_eq!(files.pwm(), "255");

        assert_eq!(fan.set_norm(1.1).unwrap(), 240);
        assert_eq!(files.pwm(), "240");

        assert_eq!(fan.set_norm(-0.1).unwrap(), 0);
        assert_eq!(files.pwm(), "0");
    }

    #[test]
    fn test_to_raw_dead_zone() {
        let fan = window(false);
        assert_eq!(fan.to_raw(0.0).unwrap(), 0);
        assert_eq!(fan.to_raw(0.001).unwrap(), 100);
        assert_eq!(fan.to_raw(0.39).unwrap(), 100);
        assert_eq!(fan.to_raw(0.5).unwrap(), 120);
        assert_eq!(fan.to_raw(1.0).unwrap(), 240);
    }

    #[test]
    fn test_to_raw_never_stop() {
        let fan = window(true);
        assert_eq!(fan.to_raw(0.0).unwrap(), 100);
        assert_eq!(fan.to_raw(-3.0).unwrap(), 100);
        assert_eq!(fan.to_raw(0.5).unwrap(), 120);
    }

    #[test]
    fn test_non_finite_speed_rejected_without_write() {
        let files = FanFiles::new();
        let mut fan = files.normalized_fan(100, 240, true);
        files.write_pwm("77\n");

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = fan.set_norm(value).unwrap_err();
            assert!(matches!(err, PwmFanError::InvalidNormalized { .. }), "{:?}", err);
            assert!(err.is_invalid_argument());
            assert!(fan.set(value).is_err());
            assert_eq!(files.pwm(), "77\n");
        }
    }

    #[test]
    fn test_to_raw_is_monotonic() {
        let fan = window(false);
        let mut previous = fan.to_raw(0.0).unwrap();
        for step in 1..=1000 {
            let raw = fan.to_raw(step as f64 / 1000.0).unwrap();
            assert!(raw >= previous);
            assert!((0..=240).contains(&raw));
            previous = raw;
        }
    }

    #[test]
    fn test_read_is_not_clamped_to_window() {
        let files = FanFiles::new();
        let fan = files.normalized_fan(100, 240, false);

        files.write_pwm("255\n");
        assert_eq!(fan.get().unwrap(), 1.0);

        files.write_pwm("50\n");
        let got = fan.get().unwrap();
        assert!((got - 50.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_get_speed_passthrough() {
        let files = FanFiles::new();
        let fan = files.normalized_fan(100, 240, false);

        files.write_fan_input("721\n");
        assert_eq!(fan.get_speed().unwrap(), 721);
    }

    #[test]
    fn test_invalid_window() {
        assert!(NormalizedPwmFan::new("/hw/pwm2", "/hw/fan2_input", 200, 100, false).is_err());
        assert!(NormalizedPwmFan::new("/hw/pwm2", "/hw/fan2_input", -1, 100, false).is_err());
        assert!(NormalizedPwmFan::new("/hw/pwm2", "/hw/fan2_input", 0, 256, false).is_err());
        assert!(NormalizedPwmFan::new("/hw/pwm2", "/hw/fan2_input", 120, 120, true).is_ok());
    }

    #[test]
    fn test_scoped_control_restores() {
        for raises in [true, false] {
            let files = FanFiles::new();
            let mut fan = files.normalized_fan(100, 240, false);

            let result: Result<()> = with_control(&mut fan, |fan| {
                assert_eq!(files.enable(), "1");
                assert_eq!(files.pwm(), "255");
                fan.set(0.39)?;
                assert_eq!(files.pwm(), "100");
                if raises {
                    return Err(PwmFanError::Cancelled);
                }
                Ok(())
            });

            assert_eq!(result.is_err(), raises);
            assert_eq!(files.enable(), "0");
            assert_eq!(files.pwm(), "0");
        }
    }
}
