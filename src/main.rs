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

//! pwmfan-fantest - measure a fan's response curve

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use pwmfan::constants::fantest;
use pwmfan::fantest::{run_fantest, FantestConfig, SweepDirection, ThreadSleeper};
use pwmfan::RawPwmFan;

#[derive(Parser)]
#[command(name = "pwmfan-fantest")]
#[command(version)]
#[command(about = "Sweep a PWM fan over its duty-cycle range and record RPM")]
#[command(long_about = "Sweep a PWM fan over its duty-cycle range and record RPM

The fan is switched to manual control for the duration of the test and put
back to its previous mode and duty cycle afterwards, including on Ctrl-C.
Writing to hwmon files usually requires root.

EXAMPLES:
    pwmfan-fantest --pwm /sys/class/hwmon/hwmon0/pwm2 --fan-input /sys/class/hwmon/hwmon0/fan2_input
    pwmfan-fantest --pwm ... --fan-input ... --step 10 --direction decrease --csv

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging")]
struct Cli {
    /// PWM control file (e.g. /sys/class/hwmon/hwmon0/pwm2)
    #[arg(long)]
    pwm: PathBuf,

    /// Tachometer file (e.g. /sys/class/hwmon/hwmon0/fan2_input)
    #[arg(long)]
    fan_input: PathBuf,

    /// Duty-cycle increment between samples
    #[arg(long, default_value_t = fantest::DEFAULT_STEP)]
    step: u8,

    /// Settle time after each step, in milliseconds
    #[arg(long, default_value_t = fantest::DEFAULT_DELAY.as_millis() as u64)]
    delay_ms: u64,

    #[arg(long, value_enum, default_value_t = Direction::Increase)]
    direction: Direction,

    /// Print samples as CSV instead of a table
    #[arg(long)]
    csv: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Direction {
    Increase,
    Decrease,
}

impl From<Direction> for SweepDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Increase => SweepDirection::Increase,
            Direction::Decrease => SweepDirection::Decrease,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(&log_level)
        .with_writer(std::io::stderr)
        .init();

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        info!("SIGNAL: Received interrupt - stopping after current step");
        cancel_handler.store(true, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let config = FantestConfig {
        step: cli.step,
        delay: Duration::from_millis(cli.delay_ms),
        direction: cli.direction.into(),
        ..FantestConfig::default()
    };

    let mut fan = RawPwmFan::new(&cli.pwm, &cli.fan_input);
    let report = run_fantest(&mut fan, &config, &ThreadSleeper, &cancel)
        .with_context(|| format!("fan test on {} failed", cli.pwm.display()))?;

    if cli.csv {
        print!("{}", report.to_csv());
    } else {
        print!("{}", report);
    }
    Ok(())
}
