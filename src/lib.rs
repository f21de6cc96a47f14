// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Seeed MR24HPC1 mmWave presence radar driver.
//!
//! The [`radar::Radar`] actor speaks the radar's UART frame protocol, keeps the entity states
//! and owns the optional reset button, which presses back into the radar through a weak
//! reference.

pub mod binding;
pub mod configuration;
pub mod entity;
pub mod errors;
pub mod host;
pub mod protocol;
pub mod radar;
pub mod startup;
pub mod transport;
pub mod util;

pub use startup::*;
