// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Child workload construction and status derivation. Everything here is pure.

pub mod builder;
pub mod status;

pub use builder::{build_child, is_controlled_by, stale_child, with_owner};
pub use status::{derive_created_status, derive_status, DerivedStatus};
