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

//! Fan configuration
//!
//! ```json
//! {
//!   "type": "normalized",
//!   "pwm": "/sys/class/hwmon/hwmon0/pwm2",
//!   "fan_input": "/sys/class/hwmon/hwmon0/fan2_input",
//!   "pwm_line_start": 100,
//!   "pwm_line_end": 240,
//!   "never_stop": false
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{limits, pwm};
use crate::error::{PwmFanError, Result};
use crate::fan::{validate_line, NormalizedPwmFan, PwmValue, RawPwmFan};
use crate::sysfs::SysfsIo;

/// Configuration of one fan, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FanConfig {
    Raw(RawFanConfig),
    Normalized(NormalizedFanConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFanConfig {
    pub pwm: PathBuf,
    pub fan_input: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFanConfig {
    pub pwm: PathBuf,
    pub fan_input: PathBuf,
    #[serde(default = "default_line_start")]
    pub pwm_line_start: PwmValue,
    #[serde(default = "default_line_end")]
    pub pwm_line_end: PwmValue,
    #[serde(default = "default_never_stop")]
    pub never_stop: bool,
}

fn default_line_start() -> PwmValue {
    pwm::DEFAULT_LINE_START
}

fn default_line_end() -> PwmValue {
    pwm::DEFAULT_LINE_END
}

fn default_never_stop() -> bool {
    pwm::DEFAULT_NEVER_STOP
}

impl FanConfig {
    /// Parse and validate a JSON fan config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FanConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a fan config file
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| PwmFanError::read(path, e))?;
        if metadata.len() > limits::MAX_CONFIG_SIZE {
            return Err(PwmFanError::invalid_config(
                path.display().to_string(),
                format!(
                    "file is {} bytes, max {} bytes",
                    metadata.len(),
                    limits::MAX_CONFIG_SIZE
                ),
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| PwmFanError::read(path, e))?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FanConfig::Raw(c) => c.validate(),
            FanConfig::Normalized(c) => c.validate(),
        }
    }

    pub fn pwm(&self) -> &Path {
        match self {
            FanConfig::Raw(c) => &c.pwm,
            FanConfig::Normalized(c) => &c.pwm,
        }
    }

    pub fn fan_input(&self) -> &Path {
        match self {
            FanConfig::Raw(c) => &c.fan_input,
            FanConfig::Normalized(c) => &c.fan_input,
        }
    }
}

impl RawFanConfig {
    pub fn validate(&self) -> Result<()> {
        validate_paths(&self.pwm, &self.fan_input)
    }

    pub fn build<F: SysfsIo>(&self, io: F) -> Result<RawPwmFan<F>> {
        self.validate()?;
        Ok(RawPwmFan::with_io(io, &self.pwm, &self.fan_input))
    }
}

impl NormalizedFanConfig {
    pub fn validate(&self) -> Result<()> {
        validate_paths(&self.pwm, &self.fan_input)?;
        validate_line(self.pwm_line_start, self.pwm_line_end)
    }

    pub fn build<F: SysfsIo>(&self, io: F) -> Result<NormalizedPwmFan<F>> {
        self.validate()?;
        NormalizedPwmFan::from_raw(
            RawPwmFan::with_io(io, &self.pwm, &self.fan_input),
            self.pwm_line_start,
            self.pwm_line_end,
            self.never_stop,
        )
    }
}

fn validate_paths(pwm_path: &Path, fan_input: &Path) -> Result<()> {
    if pwm_path.as_os_str().is_empty() {
        return Err(PwmFanError::invalid_config("pwm", "path is empty"));
    }
    if fan_input.as_os_str().is_empty() {
        return Err(PwmFanError::invalid_config("fan_input", "path is empty"));
    }

    let filename = pwm_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PwmFanError::invalid_config("pwm", "invalid filename"))?;

    if !filename.starts_with("pwm") || filename.ends_with(pwm::ENABLE_SUFFIX) {
        return Err(PwmFanError::invalid_config(
            "pwm",
            format!("{} is not a PWM control file", pwm_path.display()),
        ));
    }
    Ok(())
}
