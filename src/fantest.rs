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

//! Fan response test
//!
//! Sweeps a fan's duty cycle across the full 0-255 range and records the
//! tachometer at each step. The resulting curve shows where the fan starts
//! spinning and where it stops getting faster, which is what
//! `pwm_line_start` and `pwm_line_end` should be set to.
//!
//! The fan is held through a [`ControlGuard`](crate::fan::ControlGuard) for
//! the whole sweep, so its original mode and duty cycle come back even when
//! the test fails or is cancelled.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::constants::{fantest, pwm};
use crate::error::{PwmFanError, Result};
use crate::fan::{with_control, PwmValue, RawPwmFan, Rpm};
use crate::sysfs::SysfsIo;

/// Waits between a PWM write and the RPM read
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] that blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepDirection {
    /// 0 up to 255
    #[default]
    Increase,
    /// 255 down to 0
    Decrease,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FantestConfig {
    /// Duty-cycle increment between samples
    pub step: u8,
    /// Wait after each write before reading the tachometer
    pub delay: Duration,
    /// Wait at full speed before the sweep starts
    pub spinup: Duration,
    pub direction: SweepDirection,
}

impl Default for FantestConfig {
    fn default() -> Self {
        Self {
            step: fantest::DEFAULT_STEP,
            delay: fantest::DEFAULT_DELAY,
            spinup: fantest::SPINUP,
            direction: SweepDirection::default(),
        }
    }
}

impl FantestConfig {
    /// Duty cycles visited by the sweep, always including both ends
    pub fn sweep(&self) -> Vec<PwmValue> {
        let step = usize::from(self.step.max(1));
        let mut values: Vec<PwmValue> = (pwm::MIN_VALUE..=pwm::MAX_VALUE).step_by(step).collect();
        if values.last() != Some(&pwm::MAX_VALUE) {
            values.push(pwm::MAX_VALUE);
        }
        if self.direction == SweepDirection::Decrease {
            values.reverse();
        }
        values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FantestSample {
    pub pwm: PwmValue,
    pub rpm: Rpm,
}

/// Samples collected by [`run_fantest`], in sweep order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FantestReport {
    pub samples: Vec<FantestSample>,
}

impl FantestReport {
    pub fn max_rpm(&self) -> Option<Rpm> {
        self.samples.iter().map(|s| s.rpm).max()
    }

    /// Lowest duty cycle at which the fan was spinning
    pub fn suggested_line_start(&self) -> Option<PwmValue> {
        self.samples
            .iter()
            .filter(|s| s.rpm > 0)
            .map(|s| s.pwm)
            .min()
    }

    /// Lowest duty cycle at which the fan reached (nearly) its top speed
    pub fn suggested_line_end(&self) -> Option<PwmValue> {
        let max_rpm = self.max_rpm().filter(|&rpm| rpm > 0)?;
        let threshold = f64::from(max_rpm) * fantest::SATURATION_RATIO;
        self.samples
            .iter()
            .filter(|s| f64::from(s.rpm) >= threshold)
            .map(|s| s.pwm)
            .min()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("pwm,rpm\n");
        for sample in &self.samples {
            out.push_str(&format!("{},{}\n", sample.pwm, sample.rpm));
        }
        out
    }
}

impl fmt::Display for FantestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>5}  {:>6}", "PWM", "RPM")?;
        for sample in &self.samples {
            writeln!(f, "{:>5}  {:>6}", sample.pwm, sample.rpm)?;
        }
        match self.suggested_line_start() {
            Some(v) => writeln!(f, "suggested pwm_line_start: {}", v)?,
            None => writeln!(f, "suggested pwm_line_start: n/a (fan never spun)")?,
        }
        match self.suggested_line_end() {
            Some(v) => writeln!(f, "suggested pwm_line_end: {}", v),
            None => writeln!(f, "suggested pwm_line_end: n/a (fan never spun)"),
        }
    }
}

/// Sweep `fan` and record its speed at each duty cycle.
///
/// Setting `cancel` stops the sweep before the next step with
/// [`PwmFanError::Cancelled`]; the fan is restored either way.
pub fn run_fantest<F, S>(
    fan: &mut RawPwmFan<F>,
    config: &FantestConfig,
    sleeper: &S,
    cancel: &AtomicBool,
) -> Result<FantestReport>
where
    F: SysfsIo,
    S: Sleeper + ?Sized,
{
    let sweep = config.sweep();
    info!(
        pwm = %fan.pwm_path().display(),
        steps = sweep.len(),
        direction = ?config.direction,
        "Starting fan test"
    );

    with_control(fan, |fan| {
        sleeper.sleep(config.spinup);

        let mut report = FantestReport::default();
        for pwm in sweep {
            if cancel.load(Ordering::SeqCst) {
                info!("Fan test cancelled");
                return Err(PwmFanError::Cancelled);
            }

            fan.set(pwm)?;
            sleeper.sleep(config.delay);
            let rpm = fan.get_speed()?;
            info!(pwm, rpm, "Fan test sample");
            report.samples.push(FantestSample { pwm, rpm });
        }
        Ok(report)
    })
}
