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

//! File access for hwmon attributes
//!
//! Fans never touch `std::fs` directly. They go through [`SysfsIo`] so the
//! same code drives real `/sys/class/hwmon` files, temp directories in tests,
//! and mocks that inject failures.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PwmFanError, Result};

/// Raw read/write primitives for sysfs-style attribute files
#[cfg_attr(test, mockall::automock)]
pub trait SysfsIo {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`SysfsIo`] backed by the host filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl SysfsIo for HostFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Read an attribute and parse its trimmed content
pub fn read_value<T, F>(io: &F, path: &Path) -> Result<T>
where
    T: FromStr,
    F: SysfsIo + ?Sized,
{
    let content = io
        .read_to_string(path)
        .map_err(|e| PwmFanError::read(path, e))?;

    content.trim().parse::<T>().map_err(|_| PwmFanError::Parse {
        path: path.to_path_buf(),
        content: content.trim().to_string(),
    })
}

/// Write a value as text, without a trailing newline
pub fn write_value<F>(io: &F, path: &Path, value: impl Display) -> Result<()>
where
    F: SysfsIo + ?Sized,
{
    io.write(path, &value.to_string())
        .map_err(|e| PwmFanError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_value_trims_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fan1_input");
        fs::write(&path, "1300\n").unwrap();

        let rpm: u32 = read_value(&HostFs, &path).unwrap();
        assert_eq!(rpm, 1300);
    }

    #[test]
    fn test_read_value_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let err = read_value::<u32, _>(&HostFs, &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, PwmFanError::Io { .. }));
    }

    #[test]
    fn test_read_value_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pwm1");
        fs::write(&path, "fast\n").unwrap();

        let err = read_value::<i32, _>(&HostFs, &path).unwrap_err();
        match err {
            PwmFanError::Parse { content, .. } => assert_eq!(content, "fast"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_value_has_no_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pwm1");
        fs::write(&path, "0\n").unwrap();

        write_value(&HostFs, &path, 142).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "142");
    }

    #[test]
    fn test_write_value_maps_error() {
        let mut mock = MockSysfsIo::new();
        mock.expect_write()
            .with(eq(Path::new("/sys/pwm1")), eq("7"))
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "ro")));

        let err = write_value(&mock, Path::new("/sys/pwm1"), 7).unwrap_err();
        assert!(err.is_io());
    }
}
