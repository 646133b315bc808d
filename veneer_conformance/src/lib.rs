// Copyright 2025 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Development-only consistency tests for the Veneer draw backends.
//!
//! The contract promises that identical call sequences produce visually
//! equivalent output on every backend. This crate carries the shared
//! case list that pins that promise down:
//!
//! - Every case draws through `&mut dyn DrawCanvas` only, so the same
//!   code runs unmodified on each backend.
//! - Checks are predicates over an RGBA readback, written with enough
//!   tolerance to absorb anti-aliasing differences but not semantic ones
//!   (wrong fill region, wrong arc orientation, leaked clip state).
//! - The raster backend is the reference: its harness asserts the exact
//!   predicates, and the feature-gated backends are additionally diffed
//!   against its output with per-case pixel budgets.
//!
//! ## Run tests
//!
//! - Raster reference: `cargo test -p veneer_conformance --test raster_conformance`
//! - Vello CPU: `cargo test -p veneer_conformance --features vello_cpu --test vello_cpu_conformance`
//! - SVG (structural only): `cargo test -p veneer_conformance --features svg --test svg_conformance`
//!
//! ## Filter cases
//!
//! Set `VENEER_CONFORMANCE_CASE` to a comma/whitespace-separated list of
//! names (supports `*` globs) to run a subset.

#![allow(
    missing_docs,
    reason = "development-only crate; conformance cases are self-documenting via test names"
)]

pub mod cases;
