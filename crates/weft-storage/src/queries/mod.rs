// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the lifecycle tables.

pub mod plugin_state;
