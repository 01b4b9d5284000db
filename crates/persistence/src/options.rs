// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// How the ledger maintains each place's cached visit counter on deletes.
///
/// Logging a visit always increments the counter in the same transaction
/// as the insert. The modes differ only in what happens when visits go
/// away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CounterMode {
    /// Counters only ever grow through `log_visit`. Deleting a visit, or
    /// cascading a user or place delete, leaves counters untouched, and
    /// administrative overrides stand until `recount_visit_counts`.
    #[default]
    Cached,
    /// Every delete that removes visits recounts the affected places from
    /// the visit rows inside the same transaction.
    Exact,
}

/// Runtime options for a [`crate::Ledger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerOptions {
    /// Counter maintenance policy.
    pub counter_mode: CounterMode,
}

impl LedgerOptions {
    /// Options with the given counter mode.
    #[must_use]
    pub const fn with_counter_mode(counter_mode: CounterMode) -> Self {
        Self { counter_mode }
    }
}
