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

//! PWM fan control
//!
//! Two fan types share the [`FanControl`] capability:
//!
//! - [`RawPwmFan`] speaks hwmon units directly (duty cycle 0-255)
//! - [`NormalizedPwmFan`] wraps a raw fan and speaks fractions (0.0-1.0)
//!
//! Manual control is scoped. [`FanControl::acquire`] switches the fan to
//! manual mode and returns a [`ControlGuard`]; when the guard goes away the
//! enable mode and duty cycle recorded at acquisition are written back, on
//! every exit path including `?` returns and panics.
//!
//! # Example
//!
//! ```no_run
//! use pwmfan::{FanControl, NormalizedPwmFan};
//!
//! let mut fan = NormalizedPwmFan::new(
//!     "/sys/class/hwmon/hwmon0/pwm2",
//!     "/sys/class/hwmon/hwmon0/fan2_input",
//!     100,
//!     240,
//!     true,
//! )?;
//!
//! let mut guard = fan.acquire()?;
//! guard.set(0.5)?;
//! println!("{} RPM", guard.get_speed()?);
//! guard.release()?;
//! # Ok::<(), pwmfan::PwmFanError>(())
//! ```

mod normalized;
mod raw;

pub use normalized::NormalizedPwmFan;
pub(crate) use normalized::validate_line;
pub use raw::{RawPwmFan, Savepoint};

use std::ops::{Deref, DerefMut};
use std::path::Path;

use tracing::error;

use crate::error::{PwmFanError, Result};

/// Raw hwmon duty cycle (valid range 0-255)
pub type PwmValue = i32;

/// Normalized duty cycle (0.0 = stopped, 1.0 = top of the mapping window)
pub type PwmValueNorm = f64;

/// Tachometer reading in revolutions per minute
pub type Rpm = u32;

/// Operations shared by raw and normalized fans
pub trait FanControl {
    /// Unit the fan speaks in
    type Value: Copy;

    /// Path of the duty-cycle file, used to identify the fan in logs
    fn pwm_path(&self) -> &Path;

    fn get(&self) -> Result<Self::Value>;
    fn set(&mut self, value: Self::Value) -> Result<()>;
    fn set_full_speed(&mut self) -> Result<()>;
    fn get_speed(&self) -> Result<Rpm>;

    /// Record current hardware state and take manual control.
    ///
    /// Prefer [`FanControl::acquire`], which pairs this with
    /// [`FanControl::exit_control`] automatically.
    fn enter_control(&mut self) -> Result<()>;

    /// Write back the state recorded by [`FanControl::enter_control`].
    fn exit_control(&mut self) -> Result<()>;

    /// Take manual control for the lifetime of the returned guard
    fn acquire(&mut self) -> Result<ControlGuard<'_, Self>>
    where
        Self: Sized,
    {
        self.enter_control()?;
        Ok(ControlGuard {
            fan: self,
            released: false,
        })
    }
}

/// Manual control of a fan, restored on drop
///
/// Dereferences to the fan so every [`FanControl`] operation is available
/// through the guard.
///
/// End control with [`ControlGuard::release`] or by dropping the guard. Calling
/// `exit_control` through the guard restores the fan early but leaves the
/// guard alive, and later writes through it land on a fan that is no longer in
/// manual mode. Release and drop are no-ops after that.
#[must_use = "dropping the guard immediately releases control of the fan"]
pub struct ControlGuard<'a, F: FanControl> {
    fan: &'a mut F,
    released: bool,
}

impl<F: FanControl> ControlGuard<'_, F> {
    /// Restore the fan now and report whether restoration succeeded.
    ///
    /// Both restoration writes are attempted even when the first fails.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.fan.exit_control()
    }
}

impl<F: FanControl> Deref for ControlGuard<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.fan
    }
}

impl<F: FanControl> DerefMut for ControlGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.fan
    }
}

impl<F: FanControl> Drop for ControlGuard<'_, F> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.fan.exit_control() {
            error!(
                pwm = %self.fan.pwm_path().display(),
                error = %e,
                "Failed to restore fan state on release"
            );
        }
    }
}

/// Run `body` with manual control of `fan`, restoring the fan afterwards.
///
/// An error from `body` is returned unchanged after restoration has run. A
/// restoration error is returned only when `body` succeeded; otherwise it is
/// logged.
pub fn with_control<F, T, E, B>(fan: &mut F, body: B) -> std::result::Result<T, E>
where
    F: FanControl,
    E: From<PwmFanError>,
    B: FnOnce(&mut F) -> std::result::Result<T, E>,
{
    let mut guard = fan.acquire()?;
    let outcome = body(&mut *guard);

    match (outcome, guard.release()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(restore_err)) => Err(restore_err.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(restore_err)) => {
            error!(error = %restore_err, "Failed to restore fan state after error");
            Err(e)
        }
    }
}
