// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Per-connection session state read by the compiler.

use parking_lot::{RwLock, RwLockReadGuard};

use crate::schema::SchemaRef;

/// State of the transaction the session is currently in.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    /// Schema the transaction started with.
    pub schema: SchemaRef,
}

impl TransactionContext {
    pub fn new(schema: SchemaRef) -> Self {
        Self { schema }
    }
}

#[derive(Debug, Clone)]
pub struct SessionVars {
    pub connection_id: u64,
    /// Set while the engine runs SQL on its own behalf.
    pub in_restricted_sql: bool,
    pub txn_ctx: TransactionContext,
    /// Historical schema pinned for snapshot reads.
    pub snapshot_schema: Option<SchemaRef>,
}

impl SessionVars {
    pub fn new(connection_id: u64, txn_ctx: TransactionContext) -> Self {
        Self {
            connection_id,
            in_restricted_sql: false,
            txn_ctx,
            snapshot_schema: None,
        }
    }
}

/// A client session. Compilation only reads its variables.
#[derive(Debug)]
pub struct Session {
    vars: RwLock<SessionVars>,
}

impl Session {
    pub fn new(vars: SessionVars) -> Self {
        Self { vars: RwLock::new(vars) }
    }

    pub fn vars(&self) -> RwLockReadGuard<'_, SessionVars> {
        self.vars.read()
    }

    pub fn connection_id(&self) -> u64 {
        self.vars.read().connection_id
    }

    /// Pins (or with `None`, unpins) a historical schema for later statements.
    pub fn set_snapshot_schema(&self, schema: Option<SchemaRef>) {
        self.vars.write().snapshot_schema = schema;
    }

    pub fn set_restricted(&self, restricted: bool) {
        self.vars.write().in_restricted_sql = restricted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaSnapshot;

    #[test]
    fn test_session_snapshot_toggle() {
        let session = Session::new(SessionVars::new(42, TransactionContext::new(SchemaSnapshot::new(1).into_ref())));
        assert_eq!(session.connection_id(), 42);
        assert!(session.vars().snapshot_schema.is_none());

        session.set_snapshot_schema(Some(SchemaSnapshot::new(0).into_ref()));
        assert_eq!(session.vars().snapshot_schema.as_ref().map(|s| s.version()), Some(0));

        session.set_snapshot_schema(None);
        assert!(session.vars().snapshot_schema.is_none());
    }

    #[test]
    fn test_restricted_flag() {
        let session = Session::new(SessionVars::new(1, TransactionContext::new(SchemaSnapshot::new(5).into_ref())));
        assert!(!session.vars().in_restricted_sql);
        session.set_restricted(true);
        assert!(session.vars().in_restricted_sql);
        assert_eq!(session.vars().txn_ctx.schema.version(), 5);
    }
}
