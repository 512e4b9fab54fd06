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

//! Schema snapshots and the rule for picking which one a statement binds to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::session::SessionVars;

/// Shared handle to an immutable schema snapshot.
pub type SchemaRef = Arc<SchemaSnapshot>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub tables: BTreeMap<String, TableInfo>,
}

/// An immutable, versioned view of database and table metadata.
///
/// Snapshots are produced by schema-change machinery and never mutated
/// afterwards; every DDL yields a new snapshot with a higher version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    version: u64,
    databases: BTreeMap<String, DatabaseInfo>,
}

impl SchemaSnapshot {
    pub fn new(version: u64) -> Self {
        Self {
            version,
            databases: BTreeMap::new(),
        }
    }

    /// Builder used while assembling a snapshot, before it is shared.
    pub fn with_table(mut self, database: &str, table: TableInfo) -> Self {
        let db = self.databases.entry(database.to_string()).or_insert_with(|| DatabaseInfo {
            name: database.to_string(),
            tables: BTreeMap::new(),
        });
        db.tables.insert(table.name.clone(), table);
        self
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn database(&self, name: &str) -> Option<&DatabaseInfo> {
        self.databases.get(name)
    }

    pub fn table(&self, database: &str, table: &str) -> Option<&TableInfo> {
        self.databases.get(database).and_then(|db| db.tables.get(table))
    }

    pub fn databases(&self) -> impl Iterator<Item = &DatabaseInfo> {
        self.databases.values()
    }

    pub fn into_ref(self) -> SchemaRef {
        Arc::new(self)
    }
}

/// Returns the schema a statement must bind against.
///
/// A pinned snapshot schema on the session takes precedence over the
/// transaction's current schema.
pub fn resolve_schema(vars: &SessionVars) -> SchemaRef {
    match &vars.snapshot_schema {
        Some(snapshot) => {
            info!(connection_id = vars.connection_id, schema_version = snapshot.version(), "use snapshot schema");
            Arc::clone(snapshot)
        }
        None => Arc::clone(&vars.txn_ctx.schema),
    }
}
