// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Utility modules
//!
//! Common utilities for the cellrun CLI.

pub mod colors;

pub use colors::*;
