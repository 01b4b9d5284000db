// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for the ledger.
//!
//! This module contains every state-changing operation. Inputs arrive
//! already validated by `visit_ledger_domain`; mutations enforce existence
//! and keep the cached place counters consistent.
//!
//! ## Module Organization
//!
//! - `users`: Add, rename, and cascade-delete users
//! - `places`: Add, update (including counter override), and cascade-delete places
//! - `visits`: Log, update, and delete visits
//! - `counters`: Recomputing cached place counters from visit rows
//!
//! ## Transactions
//!
//! Any mutation that writes more than one row runs inside a single
//! `Connection::transaction`, so a failure part-way rolls back every
//! statement it issued.

pub mod counters;
pub mod places;
pub mod users;
pub mod visits;
