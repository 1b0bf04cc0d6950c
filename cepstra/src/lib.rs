// Cepstra
// Copyright (c) 2026 The Project Cepstra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # Project Cepstra
//!
//! Cepstra is a 100% pure Rust audio feature-extraction library: it turns raw audio frames into
//! numeric feature vectors (MFCC, subband energies, wavelet coefficients, ...) by composing
//! elementary signal-processing transforms into a shared computation graph.
//!
//! # Support
//!
//! The transform families of the standard catalog are listed below. All of them are enabled by
//! default; disable default features and pick individual flags to trim the catalog.
//!
//! | Transforms | Feature Flag | Default |
//! |---------------------------------|--------------|---------|
//! | Int16ToFloat, FloatToInt16 | `convert` | Yes |
//! | DCT | `dct` | Yes |
//! | DWPT, SubbandEnergy | `dwpt` | Yes |
//! | FilterBank | `filterbank` | Yes |
//! | RDFT | `rdft` | Yes |
//! | Log, Square, Rectify | `scale` | Yes |
//! | Selector, ZeroPadding | `select` | Yes |
//! | SpectralEnergy, Magnitude | `spectral` | Yes |
//! | Mean | `stats` | Yes |
//! | Window | `window` | Yes |
//!
//! # Usage
//!
//! The following steps describe a basic usage of Cepstra:
//!
//! 1.  Obtain a [`TransformRegistry`][core::registry::TransformRegistry] listing the transforms
//!     that may appear in pipelines. Use [`default::get_transforms`] to get the default registry
//!     with every enabled transform pre-registered, or build your own and register a custom
//!     catalog through [`default::register_enabled_transforms`] and
//!     [`register_all`][core::registry::TransformRegistry::register_all].
//! 2.  Instantiate a [`TransformTree`][core::tree::TransformTree] over the format of the raw
//!     input frame (sample rate and frame length), optionally with
//!     [`TreeOptions`][core::tree::TreeOptions] to enable per-transform validation or buffer
//!     dumping.
//! 3.  Declare one or more named features with
//!     [`add_feature`][core::tree::TransformTree::add_feature]. Each feature is an ordered list
//!     of `(transform name, parameters string)` steps; pipelines sharing a prefix share the
//!     computation.
//! 4.  Call [`prepare_for_execution`][core::tree::TransformTree::prepare_for_execution] once.
//!     This freezes the graph and packs all intermediate buffers into one arena.
//! 5.  Call [`execute`][core::tree::TransformTree::execute] with a frame of samples. The result
//!     maps every feature name to its output [`Buffers`][core::buffers::Buffers].
//! 6.  Repeat step 5 for further frames.
//!
//! ```
//! use cepstra::core::formats::BufferFormat;
//! use cepstra::core::tree::TransformTree;
//!
//! let registry = cepstra::default::get_transforms();
//!
//! let mut tree = TransformTree::new(BufferFormat::raw_int16(16000, 48000));
//! tree.add_feature(
//!     "Energy",
//!     &[("Window", "length=512"), ("RDFT", ""), ("SpectralEnergy", "")],
//!     registry,
//! )
//! .unwrap();
//! tree.prepare_for_execution().unwrap();
//!
//! let frame = vec![0i16; 16000];
//! let results = tree.execute(&frame).unwrap();
//! assert_eq!(results["Energy"].format().length(), 257);
//! ```

pub mod default {
    //! The `default` module provides convenience functions and registries to get an implementer
    //! up-and-running as quickly as possible, and to reduce boiler-plate. Using the `default`
    //! module is completely optional and incurs no overhead unless actually used.

    pub mod transforms {
        //! The `transforms` module re-exports all enabled Cepstra transforms.

        #[cfg(feature = "dct")]
        pub use cepstra_transforms::Dct as Dct;
        #[cfg(feature = "dwpt")]
        pub use cepstra_transforms::Dwpt as Dwpt;
        #[cfg(feature = "filterbank")]
        pub use cepstra_transforms::FilterBank as FilterBank;
        #[cfg(feature = "convert")]
        pub use cepstra_transforms::FloatToInt16 as FloatToInt16;
        #[cfg(feature = "convert")]
        pub use cepstra_transforms::Int16ToFloat as Int16ToFloat;
        #[cfg(feature = "scale")]
        pub use cepstra_transforms::Log as Log;
        #[cfg(feature = "spectral")]
        pub use cepstra_transforms::Magnitude as Magnitude;
        #[cfg(feature = "stats")]
        pub use cepstra_transforms::Mean as Mean;
        #[cfg(feature = "rdft")]
        pub use cepstra_transforms::Rdft as Rdft;
        #[cfg(feature = "scale")]
        pub use cepstra_transforms::Rectify as Rectify;
        #[cfg(feature = "select")]
        pub use cepstra_transforms::Selector as Selector;
        #[cfg(feature = "spectral")]
        pub use cepstra_transforms::SpectralEnergy as SpectralEnergy;
        #[cfg(feature = "scale")]
        pub use cepstra_transforms::Square as Square;
        #[cfg(feature = "dwpt")]
        pub use cepstra_transforms::SubbandEnergy as SubbandEnergy;
        #[cfg(feature = "window")]
        pub use cepstra_transforms::Window as Window;
        #[cfg(feature = "select")]
        pub use cepstra_transforms::ZeroPadding as ZeroPadding;
    }

    use lazy_static::lazy_static;

    use cepstra_core::registry::TransformRegistry;

    lazy_static! {
        static ref TRANSFORM_REGISTRY: TransformRegistry = {
            let mut registry = TransformRegistry::new();
            register_enabled_transforms(&mut registry);
            registry
        };
    }

    /// Gets the default `TransformRegistry`. This registry pre-registers all the transforms
    /// selected by the `feature` flags in the includer's `Cargo.toml`. If `features` is not set,
    /// the whole standard catalog is registered.
    ///
    /// This function is lazy and does not instantiate the `TransformRegistry` until the first
    /// call.
    pub fn get_transforms() -> &'static TransformRegistry {
        &TRANSFORM_REGISTRY
    }

    /// Registers all the transforms selected by the `feature` flags in the includer's
    /// `Cargo.toml` on the provided `TransformRegistry`. If `features` is not set, the whole
    /// standard catalog is registered.
    ///
    /// Use this function to easily populate a custom registry with all enabled transforms.
    pub fn register_enabled_transforms(registry: &mut TransformRegistry) {
        #[cfg(feature = "window")]
        registry.register_all::<transforms::Window>();

        #[cfg(feature = "select")]
        registry.register_all::<transforms::ZeroPadding>();

        #[cfg(feature = "rdft")]
        registry.register_all::<transforms::Rdft>();

        #[cfg(feature = "spectral")]
        registry.register_all::<transforms::SpectralEnergy>();

        #[cfg(feature = "spectral")]
        registry.register_all::<transforms::Magnitude>();

        #[cfg(feature = "filterbank")]
        registry.register_all::<transforms::FilterBank>();

        #[cfg(feature = "scale")]
        registry.register_all::<transforms::Log>();

        #[cfg(feature = "scale")]
        registry.register_all::<transforms::Square>();

        #[cfg(feature = "scale")]
        registry.register_all::<transforms::Rectify>();

        #[cfg(feature = "dct")]
        registry.register_all::<transforms::Dct>();

        #[cfg(feature = "select")]
        registry.register_all::<transforms::Selector>();

        #[cfg(feature = "dwpt")]
        registry.register_all::<transforms::Dwpt>();

        #[cfg(feature = "dwpt")]
        registry.register_all::<transforms::SubbandEnergy>();

        #[cfg(feature = "stats")]
        registry.register_all::<transforms::Mean>();

        #[cfg(feature = "convert")]
        registry.register_all::<transforms::Int16ToFloat>();

        #[cfg(feature = "convert")]
        registry.register_all::<transforms::FloatToInt16>();
    }
}

pub use cepstra_core as core;
