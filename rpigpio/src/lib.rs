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

//! BCM2835 GPIO register report.
//!
//! Reads the function select, pin level and event detect status registers
//! of the 54 GPIO lines of a BCM2835-family SoC and formats them as text,
//! one line per pin:
//!
//! ```text
//! GPIO 14: Function: Alt 0   Level: High      Event: No event
//! ```
//!
//! The register space is mapped from `/dev/gpiomem` (or `/dev/mem`) for
//! every report and unmapped afterwards.
//!
//! ```no_run
//! use rpigpio::{Endpoint, GpioMem, GpioReport};
//!
//! let report = GpioReport::new(GpioMem::gpiomem());
//! report.show(&mut std::io::stdout())?;
//! # Ok::<(), rpigpio::Error>(())
//! ```

pub mod endpoint;
pub mod error;
pub mod provider;
pub mod regs;
pub mod report;

pub use endpoint::{Endpoint, GpioReport, Registry};
pub use error::{Error, Result};
pub use provider::{GpioMem, ImageFile, Mapping, RegisterProvider};
pub use regs::{RegisterImage, RegisterSpace};
pub use report::{decode_pin, generate_report, pin_states, Event, Function, Level, PinState};
