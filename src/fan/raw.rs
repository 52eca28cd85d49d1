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

//! Raw hwmon PWM fan
//!
//! Reads and writes the three hwmon attributes of one fan channel:
//!
//! - `pwmN` - duty cycle, 0 (off/min) to 255 (full speed)
//! - `pwmN_enable` - control mode (0 = off, 1 = manual, 2+ = automatic)
//! - `fanN_input` - tachometer, RPM

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{FanControl, PwmValue, Rpm};
use crate::constants::pwm;
use crate::error::{PwmFanError, Result};
use crate::sysfs::{read_value, write_value, HostFs, SysfsIo};

/// Hardware state captured when manual control is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint {
    pub enable: u8,
    pub duty_cycle: PwmValue,
}

/// PWM fan addressed in raw hwmon units
#[derive(Debug)]
pub struct RawPwmFan<F: SysfsIo = HostFs> {
    io: F,
    pwm_path: PathBuf,
    enable_path: PathBuf,
    fan_input_path: PathBuf,
    savepoint: Option<Savepoint>,
}

impl RawPwmFan<HostFs> {
    /// Fan backed by the host filesystem
    ///
    /// # Arguments
    /// * `pwm` - Path to the PWM control file (e.g., /sys/class/hwmon/hwmon0/pwm2)
    /// * `fan_input` - Path to the tachometer file (e.g., /sys/class/hwmon/hwmon0/fan2_input)
    pub fn new(pwm: impl Into<PathBuf>, fan_input: impl Into<PathBuf>) -> Self {
        Self::with_io(HostFs, pwm, fan_input)
    }
}

impl<F: SysfsIo> RawPwmFan<F> {
    /// Fan backed by an arbitrary [`SysfsIo`]
    ///
    /// The enable file is the PWM path with `_enable` appended.
    pub fn with_io(io: F, pwm: impl Into<PathBuf>, fan_input: impl Into<PathBuf>) -> Self {
        let pwm_path = pwm.into();
        let mut enable_path = pwm_path.clone().into_os_string();
        enable_path.push(pwm::ENABLE_SUFFIX);

        Self {
            io,
            pwm_path,
            enable_path: PathBuf::from(enable_path),
            fan_input_path: fan_input.into(),
            savepoint: None,
        }
    }

    pub fn pwm_path(&self) -> &Path {
        &self.pwm_path
    }

    pub fn enable_path(&self) -> &Path {
        &self.enable_path
    }

    pub fn fan_input_path(&self) -> &Path {
        &self.fan_input_path
    }

    /// State recorded by the current acquisition, if control is held
    pub fn savepoint(&self) -> Option<Savepoint> {
        self.savepoint
    }

    pub fn is_controlled(&self) -> bool {
        self.savepoint.is_some()
    }

    /// Read current duty cycle
    pub fn get(&self) -> Result<PwmValue> {
        read_value(&self.io, &self.pwm_path)
    }

    /// Write a duty cycle. Values outside 0-255 are rejected before any write.
    pub fn set(&mut self, value: PwmValue) -> Result<()> {
        if !(pwm::MIN_VALUE..=pwm::MAX_VALUE).contains(&value) {
            return Err(PwmFanError::InvalidArgument { value });
        }
        debug!(pwm = %self.pwm_path.display(), value, "Writing PWM");
        write_value(&self.io, &self.pwm_path, value)
    }

    pub fn set_full_speed(&mut self) -> Result<()> {
        self.set(pwm::MAX_VALUE)
    }

    /// Read current fan speed in RPM
    pub fn get_speed(&self) -> Result<Rpm> {
        read_value(&self.io, &self.fan_input_path)
    }

    fn read_enable(&self) -> Result<u8> {
        read_value(&self.io, &self.enable_path)
    }

    fn write_enable(&self, mode: u8) -> Result<()> {
        debug!(enable = %self.enable_path.display(), mode, "Writing PWM enable mode");
        write_value(&self.io, &self.enable_path, mode)
    }

    /// Save enable mode and duty cycle, switch to manual mode at full speed.
    ///
    /// If switching fails part way, whatever was already changed is rolled
    /// back before the error is returned.
    pub fn enter_control(&mut self) -> Result<()> {
        if self.savepoint.is_some() {
            return Err(PwmFanError::AlreadyControlled {
                path: self.pwm_path.clone(),
            });
        }

        let saved = Savepoint {
            enable: self.read_enable()?,
            duty_cycle: self.get()?,
        };
        self.savepoint = Some(saved);
        debug!(
            pwm = %self.pwm_path.display(),
            enable = saved.enable,
            duty_cycle = saved.duty_cycle,
            "Taking manual control"
        );

        let applied = self
            .write_enable(pwm::enable::MANUAL)
            .and_then(|()| self.set_full_speed());

        if let Err(e) = applied {
            if let Err(restore_err) = self.exit_control() {
                warn!(
                    pwm = %self.pwm_path.display(),
                    error = %restore_err,
                    "Rollback after failed acquisition was incomplete"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Write back the saved enable mode, then the saved duty cycle.
    ///
    /// Both writes are attempted; the first failure is returned. Does
    /// nothing when control is not held.
    pub fn exit_control(&mut self) -> Result<()> {
        let Some(saved) = self.savepoint.take() else {
            return Ok(());
        };

        let enable_result = self.write_enable(saved.enable);
        if let Err(ref e) = enable_result {
            warn!(
                enable = %self.enable_path.display(),
                error = %e,
                "Failed to restore PWM enable mode"
            );
        }

        let duty_result = self.set(saved.duty_cycle);
        if let Err(ref e) = duty_result {
            warn!(
                pwm = %self.pwm_path.display(),
                error = %e,
                "Failed to restore PWM duty cycle"
            );
        }

        debug!(pwm = %self.pwm_path.display(), "Released manual control");
        enable_result.and(duty_result)
    }
}

impl<F: SysfsIo> FanControl for RawPwmFan<F> {
    type Value = PwmValue;

    fn pwm_path(&self) -> &Path {
        &self.pwm_path
    }

    fn get(&self) -> Result<PwmValue> {
        RawPwmFan::get(self)
    }

    fn set(&mut self, value: PwmValue) -> Result<()> {
        RawPwmFan::set(self, value)
    }

    fn set_full_speed(&mut self) -> Result<()> {
        RawPwmFan::set_full_speed(self)
    }

    fn get_speed(&self) -> Result<Rpm> {
        RawPwmFan::get_speed(self)
    }

    fn enter_control(&mut self) -> Result<()> {
        RawPwmFan::enter_control(self)
    }

    fn exit_control(&mut self) -> Result<()> {
        RawPwmFan::exit_control(self)
    }
}
