//
// rpigpio - BCM2835 GPIO register report
// Copyright (C) 2015-2026 rpigpio authors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

//! Prints the GPIO register report.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Target;
use log::LevelFilter;
use rpigpio::{GpioMem, GpioReport, ImageFile, RegisterImage, RegisterProvider, Registry};
use std::{
    fs,
    io::{self, Write},
    num::ParseIntError,
    path::PathBuf,
};

mod syslog;

/// Name of the report endpoint.
const ENDPOINT: &str = "rpigpio";

/// BCM2835 GPIO register report.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opts {
    /// Memory device to map the GPIO registers from.
    #[arg(short, long, env = "RPIGPIO_DEVICE", default_value = GpioMem::GPIOMEM)]
    device: PathBuf,
    /// Offset of the GPIO registers within the memory device.
    ///
    /// Use 0x20200000 together with /dev/mem.
    #[arg(long, env = "RPIGPIO_OFFSET", value_parser = parse_maybe_hex, default_value = "0")]
    offset: u64,
    /// Read a saved register image instead of mapping the device.
    #[arg(short, long, conflicts_with_all = ["device", "offset"])]
    image: Option<PathBuf>,
    /// Save the register image to the specified file.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Log level.
    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    level: LevelFilter,
    /// Log to syslog instead of standard error.
    #[arg(short, long)]
    syslog: bool,
    /// Syslog identifier.
    #[arg(long, default_value = ENDPOINT)]
    ident: String,
}

fn parse_maybe_hex(s: &str) -> Result<u64, ParseIntError> {
    match s.to_ascii_lowercase().strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse::<u64>(),
    }
}

/// Registers the report endpoint backed by the register source selected by the options.
fn register_report(registry: &mut Registry, opts: &Opts) -> Result<()> {
    let device = GpioMem::new(&opts.device, opts.offset);

    match (&opts.image, &opts.save) {
        (Some(image), None) => registry.register(ENDPOINT, GpioReport::new(ImageFile::new(image)))?,
        (None, None) => registry.register(ENDPOINT, GpioReport::new(device))?,
        (image, Some(save)) => {
            // Report exactly what gets saved.
            let snapshot = match image {
                Some(image) => ImageFile::new(image).acquire()?,
                None => RegisterImage::capture(&device.acquire()?),
            };
            fs::write(save, snapshot.as_bytes())
                .with_context(|| format!("cannot save register image to {}", save.display()))?;
            log::info!("saved register image to {}", save.display());
            registry.register(ENDPOINT, GpioReport::new(snapshot))?
        }
    }

    Ok(())
}

fn perform(opts: &Opts) -> Result<()> {
    let mut registry = Registry::new();
    register_report(&mut registry, opts).context("cannot register GPIO report")?;

    let res = {
        let mut stdout = io::stdout().lock();
        registry.show(ENDPOINT, &mut stdout).and_then(|()| Ok(stdout.flush()?))
    };
    registry.unregister(ENDPOINT)?;

    res.context("cannot generate GPIO report")
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialize logger.
    if opts.syslog {
        let syslog = syslog::Syslog::new(&opts.ident).context("invalid syslog identifier")?;
        log::set_boxed_logger(Box::new(syslog))?;
        log::set_max_level(opts.level);
    } else {
        env_logger::builder().target(Target::Stderr).filter_level(opts.level).init();
    }

    let res = perform(&opts);
    if let Err(err) = &res {
        log::error!("GPIO report failed: {err:#}");
    }
    res
}
