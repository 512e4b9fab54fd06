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

//! # DotDB Statement Compiler
//!
//! Turns a parsed SQL statement into a compiled statement the executor can
//! run, and decides on the way whether the plan is safe to run at all.
//!
//! ## Pipeline
//!
//! 1. **Schema resolution**: bind against the session's pinned snapshot
//!    schema if it has one, else the transaction's schema.
//! 2. **Preprocessing**: name resolution and validation (external).
//! 3. **Optimization**: produce a physical plan (external).
//! 4. **Counting**: count the statement under its type label.
//! 5. **Cost classification**: compare every plan node's row estimate with
//!    the configured thresholds; reject plans that are too expensive.
//!
//! ## Usage
//!
//! ```rust
//! use dotdb_compiler::ast::{Statement, StatementKind};
//! use dotdb_compiler::plan::{PhysicalOperator, PhysicalPlan, Plan};
//! use dotdb_compiler::{CompilerConfig, ExpensiveLevel, query_expensive_level};
//!
//! let mut config = CompilerConfig::default();
//! config.log.expensive_threshold = 1000;
//!
//! let plan = Plan::Physical(
//!     PhysicalPlan::new(PhysicalOperator::HashAgg { group_by: vec![] }, 1)
//!         .with_child(PhysicalPlan::new(PhysicalOperator::TableScan { table: "orders".to_string() }, 50_000)),
//! );
//! assert_eq!(query_expensive_level(&plan, &config.thresholds()), ExpensiveLevel::Expensive);
//!
//! let stmt = Statement::new("BEGIN", StatementKind::Begin);
//! assert_eq!(dotdb_compiler::statement_label(&stmt), "Begin");
//! ```

pub mod ast;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod cost;
pub mod counters;
pub mod error;
pub mod plan;
pub mod schema;
pub mod session;

pub use classify::{IGNORE_LABEL, OTHER_LABEL, count_statement, statement_label};
pub use compiler::{CacheabilityChecker, Collaborators, CompiledStatement, Compiler, Optimizer, Preprocessor};
pub use config::{CompilerConfig, LogConfig, global_config, store_global_config};
pub use cost::{ExpensiveLevel, Thresholds, physical_plan_expensive_level, query_expensive_level};
pub use counters::{MetricsStatementCounter, StatementCounter, StatementMetrics};
pub use error::{CompileError, CompileResult, ConfigError, ConfigResult, ExternalError};
pub use schema::{SchemaRef, SchemaSnapshot, resolve_schema};
pub use session::{Session, SessionVars, TransactionContext};
