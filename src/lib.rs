// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! tesla is a command-line tool for checking on, and waking up, a Tesla
//! from the terminal. It logs in to the Tesla owner API, wakes the car up
//! if it is asleep, waits for it to come online, and then shows its state
//! or sends it a command.
//!
//! # Examples
//!
//! Store your credentials and pick a vehicle:
//!
//! ```bash
//! tesla setup
//! ```
//!
//! Wake the car up, checking every 5 seconds and giving up after 20 tries:
//!
//! ```bash
//! tesla wake-up --retry-delay 5 --max-attempts 20
//! ```
//!
//! Show the charge state, with distances in miles:
//!
//! ```bash
//! tesla charge-state --unit mi
//! ```
//!
//! Show the car and climate state:
//!
//! ```bash
//! tesla car-state
//! tesla climate-state
//! ```
//!
//! Turn climate control on or off:
//!
//! ```bash
//! tesla climate-start
//! tesla climate-stop
//! ```
//!
//! Get usage and help for the tool:
//!
//! ```bash
//! tesla --help
//! ```
//!
//! # Configuration
//!
//! `tesla setup` stores your e-mail address, password and the VIN of your
//! car in `~/.tesla_cli/config.yaml`. Use `--config` to keep them somewhere
//! else.
//!
//! If `$TESLA_ACCESS_TOKEN` is set, it is used to authenticate instead of
//! the stored password.
//!
//! # Waking up
//!
//! Every command that talks to the car first makes sure it is online. The
//! [`WakeCoordinator`](wake::WakeCoordinator) sends a wake-up signal, then
//! polls the account's vehicle list until the car reports that it is
//! online, signalling again every 10 attempts. See the [`wake`] module for
//! the details.
//!
//! # License
//!
//! tesla is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0

pub mod cli;
pub mod clock;
pub mod conf;
pub mod http;
pub mod tesla;
pub mod text;
pub mod view;
pub mod wake;

#[cfg(test)]
mod test_utils;
