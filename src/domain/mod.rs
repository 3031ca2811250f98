// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Pure domain models without I/O or rendering concerns.

pub mod crop;
