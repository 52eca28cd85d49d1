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

//! pwmfan - Scoped PWM fan control for Linux hwmon
//!
//! Drives a single fan channel through its sysfs files, either with raw
//! 0-255 duty cycles or with a normalized 0.0-1.0 speed mapped onto the
//! fan's usable window. Taking manual control is scoped: the fan's previous
//! mode and duty cycle are put back when the scope ends.

pub mod config;
pub mod constants;
pub mod error;
pub mod fan;
pub mod fantest;
pub mod sysfs;

pub use config::FanConfig;
pub use error::{PwmFanError, Result};
pub use fan::{
    with_control, ControlGuard, FanControl, NormalizedPwmFan, PwmValue, PwmValueNorm,
    RawPwmFan, Rpm, Savepoint,
};
pub use sysfs::{HostFs, SysfsIo};

#[cfg(test)]
pub mod test_utils;
