// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for the ledger.
//!
//! This module contains all read-only queries. None of them open a
//! transaction of their own; mutations call the existence checks from
//! inside their transactions.
//!
//! ## Module Organization
//!
//! - `users`: User lookups and listing
//! - `places`: Place lookups, listing, and the most-visited ranking
//! - `visits`: Visit lookups and per-user visit history
//! - `summary`: Store-wide totals

pub mod places;
pub mod summary;
pub mod users;
pub mod visits;
