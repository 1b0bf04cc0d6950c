// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
// The following lints are allowed in all Cepstra crates. Please see the root Cargo.toml for their
// justification.
#![allow(clippy::excessive_precision)]
#![allow(clippy::identity_op)]
#![allow(clippy::manual_range_contains)]

//! The `cepstra-transforms` crate provides the standard transform catalog: the elementary
//! signal-processing operations feature pipelines are composed of.
//!
//! Every transform family sits behind a feature flag of the same name; the standalone crate
//! enables all of them by default, and the `cepstra` facade crate forwards its own transform
//! features here. Every transform implements the
//! [`Transform`][cepstra_core::transform::Transform] contract and registers through
//! [`support_transform!`][cepstra_core::support_transform]; the facade crate's
//! `default::get_transforms()` returns a registry with every enabled transform pre-registered.

#[cfg(feature = "convert")]
mod convert;
#[cfg(feature = "dct")]
mod dct;
#[cfg(feature = "dwpt")]
mod dwpt;
#[cfg(feature = "filterbank")]
mod filter_bank;
#[cfg(feature = "rdft")]
mod rdft;
#[cfg(feature = "scale")]
mod scale;
#[cfg(feature = "select")]
mod select;
#[cfg(feature = "spectral")]
mod spectral;
#[cfg(feature = "stats")]
mod stats;
#[cfg(feature = "window")]
mod window;

#[cfg(feature = "convert")]
pub use convert::{FloatToInt16, Int16ToFloat};
#[cfg(feature = "dct")]
pub use dct::Dct;
#[cfg(feature = "dwpt")]
pub use dwpt::{Dwpt, SubbandEnergy};
#[cfg(feature = "filterbank")]
pub use filter_bank::FilterBank;
#[cfg(feature = "rdft")]
pub use rdft::Rdft;
#[cfg(feature = "scale")]
pub use scale::{Log, Rectify, Square};
#[cfg(feature = "select")]
pub use select::{Selector, ZeroPadding};
#[cfg(feature = "spectral")]
pub use spectral::{Magnitude, SpectralEnergy};
#[cfg(feature = "stats")]
pub use stats::Mean;
#[cfg(feature = "window")]
pub use window::{window_element, Window, WindowType};
