/*
 * Test utilities for pwmfan
 *
 * Builds a throwaway hwmon-like directory holding one fan channel
 * (pwm2, pwm2_enable, fan2_input) so fan tests can run against real files.
 */

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fan::{NormalizedPwmFan, PwmValue, RawPwmFan};

/// One fan channel on disk, seeded with pwm `0`, enable `0`, and `1300` RPM
pub struct FanFiles {
    dir: TempDir,
    pub pwm_path: PathBuf,
    pub enable_path: PathBuf,
    pub fan_input_path: PathBuf,
}

impl FanFiles {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let pwm_path = dir.path().join("pwm2");
        let enable_path = dir.path().join("pwm2_enable");
        let fan_input_path = dir.path().join("fan2_input");

        fs::write(&pwm_path, "0\n").expect("seed pwm");
        fs::write(&enable_path, "0\n").expect("seed pwm_enable");
        fs::write(&fan_input_path, "1300\n").expect("seed fan_input");

        Self {
            dir,
            pwm_path,
            enable_path,
            fan_input_path,
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn raw_fan(&self) -> RawPwmFan {
        RawPwmFan::new(&self.pwm_path, &self.fan_input_path)
    }

    pub fn normalized_fan(
        &self,
        line_start: PwmValue,
        line_end: PwmValue,
        never_stop: bool,
    ) -> NormalizedPwmFan {
        NormalizedPwmFan::new(
            &self.pwm_path,
            &self.fan_input_path,
            line_start,
            line_end,
            never_stop,
        )
        .expect("valid mapping window")
    }

    pub fn pwm(&self) -> String {
        fs::read_to_string(&self.pwm_path).expect("read pwm")
    }

    pub fn enable(&self) -> String {
        fs::read_to_string(&self.enable_path).expect("read pwm_enable")
    }

    pub fn write_pwm(&self, content: &str) {
        fs::write(&self.pwm_path, content).expect("write pwm");
    }

    pub fn write_enable(&self, content: &str) {
        fs::write(&self.enable_path, content).expect("write pwm_enable");
    }

    pub fn write_fan_input(&self, content: &str) {
        fs::write(&self.fan_input_path, content).expect("write fan_input");
    }
}
