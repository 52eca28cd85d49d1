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

//! Constants for pwmfan
//!
//! Centralizes the hwmon value ranges, configuration defaults and fantest
//! parameters. Add new magic numbers here rather than inline.

/// PWM control constants
pub mod pwm {
    use crate::fan::PwmValue;

    /// Minimum PWM value (fan off or minimum speed)
    pub const MIN_VALUE: PwmValue = 0;

    /// Maximum PWM value (full speed)
    pub const MAX_VALUE: PwmValue = 255;

    /// Suffix appended to the `pwmN` path to get its enable file
    pub const ENABLE_SUFFIX: &str = "_enable";

    /// Default start of the mapping window
    pub const DEFAULT_LINE_START: PwmValue = 100;

    /// Default end of the mapping window
    pub const DEFAULT_LINE_END: PwmValue = 240;

    /// Default never-stop policy
    pub const DEFAULT_NEVER_STOP: bool = true;

    /// PWM enable values
    pub mod enable {
        /// PWM control disabled (full speed on most drivers)
        pub const DISABLED: u8 = 0;
        /// Manual PWM control
        pub const MANUAL: u8 = 1;
        /// Automatic/thermal control
        pub const AUTOMATIC: u8 = 2;
    }
}

/// File size limits
pub mod limits {
    /// Maximum fan config file size (64KB)
    pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;
}

/// Fan test parameters
pub mod fantest {
    use std::time::Duration;

    /// Default duty-cycle step between samples
    pub const DEFAULT_STEP: u8 = 5;

    /// Default wait between a PWM write and the RPM read
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    /// Time given to the fan to reach full speed before sweeping
    pub const SPINUP: Duration = Duration::from_secs(5);

    /// Fraction of the maximum RPM treated as saturated
    pub const SATURATION_RATIO: f64 = 0.98;
}
