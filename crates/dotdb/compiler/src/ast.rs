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

//! Parsed statement nodes handed to the compiler.
//!
//! The parser lives outside this crate. What it produces is a [`Statement`]:
//! the literal SQL text plus exactly one [`StatementKind`]. The set of kinds is
//! closed, so every consumer that matches on it is checked for exhaustiveness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { schema: None, name: name.into() }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub from: Vec<TableName>,
    pub has_where: bool,
    pub limit: Option<u64>,
    pub for_update: bool,
}

/// Where the rows of an `INSERT`/`REPLACE` come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    Values { rows: usize },
    Select(Box<SelectStmt>),
    Set { columns: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStmt {
    pub table: TableName,
    pub columns: Vec<String>,
    pub source: InsertSource,
    /// `REPLACE INTO` shares the insert node and only flips this flag.
    pub is_replace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStmt {
    pub tables: Vec<TableName>,
    pub assignments: Vec<String>,
    pub has_where: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStmt {
    pub tables: Vec<TableName>,
    pub has_where: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssignment {
    pub name: String,
    pub value: String,
    pub is_global: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowTarget {
    Databases,
    Tables,
    Columns,
    Variables,
    Status,
    Processlist,
    Grants,
    CreateTable,
}

/// Every statement shape the parser can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    // Data definition
    AlterTable { table: TableName, specs: Vec<String> },
    AnalyzeTable { tables: Vec<TableName> },
    CreateDatabase { name: String, if_not_exists: bool },
    CreateIndex { name: String, table: TableName, columns: Vec<String>, unique: bool },
    CreateTable { table: TableName, if_not_exists: bool },
    CreateUser { users: Vec<String>, if_not_exists: bool },
    DropDatabase { name: String, if_exists: bool },
    DropIndex { name: String, table: TableName, if_exists: bool },
    DropTable { tables: Vec<TableName>, if_exists: bool },
    DropUser { users: Vec<String>, if_exists: bool },
    RenameTable { from: TableName, to: TableName },
    TruncateTable { table: TableName },

    // Data manipulation
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    LoadData { path: String, table: TableName, is_local: bool },

    // Transaction control
    Begin,
    Commit,
    Rollback,

    // Prepared statement lifecycle
    Prepare { name: String, sql: String },
    Execute { name: String, using: Vec<String> },
    Deallocate { name: String },

    // Administration
    Explain { analyze: bool, statement: Box<Statement> },
    Show { target: ShowTarget, full: bool },
    Set { variables: Vec<VariableAssignment> },
    SetPassword { user: Option<String>, password: String },
    Grant { privileges: Vec<String>, users: Vec<String> },
    Revoke { privileges: Vec<String>, users: Vec<String> },
    Use { database: String },
    Kill { connection_id: u64, query_only: bool },
    Flush { target: String },
    Do { expressions: Vec<String> },
}

/// A parsed statement together with the SQL text it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    text: String,
    kind: StatementKind,
}

impl Statement {
    pub fn new(text: impl Into<String>, kind: StatementKind) -> Self {
        Self { text: text.into(), kind }
    }

    /// The original SQL text, as typed by the client.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &StatementKind {
        &self.kind
    }

    /// Mutable access for rewrites done while preprocessing.
    pub fn kind_mut(&mut self) -> &mut StatementKind {
        &mut self.kind
    }
}
