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

//! Statement compilation: from a parsed statement to a classified,
//! executable plan.

use std::borrow::Cow;
use std::sync::Arc;
use tracing::{Span, debug, info_span, warn};

use crate::ast::Statement;
use crate::classify::count_statement;
use crate::config::{CompilerConfig, global_config};
use crate::cost::{ExpensiveLevel, Thresholds, query_expensive_level};
use crate::counters::StatementMetrics;
use crate::error::{CompileError, CompileResult, ExternalError};
use crate::plan::Plan;
use crate::schema::{SchemaRef, SchemaSnapshot, resolve_schema};
use crate::session::Session;

/// Longest statement text, in bytes, written to the expensive-query log.
pub const LOG_SQL_LEN: usize = 1024;

/// Name resolution and validation. May rewrite the statement in place.
#[cfg_attr(test, mockall::automock)]
pub trait Preprocessor: Send + Sync {
    fn preprocess(&self, session: &Session, stmt: &mut Statement, schema: &SchemaSnapshot, prepared_execute: bool) -> Result<(), ExternalError>;
}

/// Turns a validated statement into a physical plan.
#[cfg_attr(test, mockall::automock)]
pub trait Optimizer: Send + Sync {
    fn optimize(&self, session: &Session, stmt: &Statement, schema: &SchemaSnapshot) -> Result<Plan, ExternalError>;
}

/// Whether a statement's plan may be reused across parameter bindings.
#[cfg_attr(test, mockall::automock)]
pub trait CacheabilityChecker: Send + Sync {
    fn cacheable(&self, stmt: &Statement) -> bool;
}

/// The external services a [`Compiler`] hands work to.
#[derive(Clone)]
pub struct Collaborators {
    pub preprocessor: Arc<dyn Preprocessor>,
    pub optimizer: Arc<dyn Optimizer>,
    pub cacheability: Arc<dyn CacheabilityChecker>,
    pub metrics: Arc<dyn StatementMetrics>,
}

/// Output of [`Compiler::compile`], ready to be handed to the executor.
#[derive(Debug)]
pub struct CompiledStatement {
    pub schema: SchemaRef,
    pub plan: Plan,
    /// Some plan node is estimated above the expensive threshold.
    pub expensive: bool,
    pub cacheable: bool,
    pub text: String,
    pub statement: Statement,
    pub session: Arc<Session>,
}

pub struct Compiler {
    session: Arc<Session>,
    collaborators: Collaborators,
    config: Arc<CompilerConfig>,
}

impl Compiler {
    /// Builds a compiler reading thresholds from the process-wide configuration.
    pub fn new(session: Arc<Session>, collaborators: Collaborators) -> Self {
        Self {
            session,
            collaborators,
            config: global_config(),
        }
    }

    pub fn with_config(mut self, config: Arc<CompilerConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `stmt` into an executable, classified statement.
    ///
    /// Fails if preprocessing or optimization fails, or if the optimized plan
    /// is too expensive to run. Nothing is returned on failure.
    ///
    /// Runs inside an `executor.compile` span when the caller is already
    /// traced; untraced calls open no span.
    pub fn compile(&self, stmt: Statement) -> CompileResult<CompiledStatement> {
        let parent = Span::current();
        let span = if parent.is_none() {
            Span::none()
        } else {
            info_span!(parent: &parent, "executor.compile", connection_id = self.session.connection_id())
        };
        let _entered = span.enter();
        self.compile_in_span(stmt)
    }

    fn compile_in_span(&self, mut stmt: Statement) -> CompileResult<CompiledStatement> {
        // One read of the session, released before any collaborator runs.
        let (schema, in_restricted_sql) = {
            let vars = self.session.vars();
            (resolve_schema(&vars), vars.in_restricted_sql)
        };

        self.collaborators
            .preprocessor
            .preprocess(&self.session, &mut stmt, &schema, false)
            .map_err(CompileError::Validation)?;
        debug!(schema_version = schema.version(), "statement preprocessed");

        let plan = self.collaborators.optimizer.optimize(&self.session, &stmt, &schema).map_err(CompileError::Optimization)?;

        count_statement(self.collaborators.metrics.as_ref(), &stmt, in_restricted_sql);

        let level = log_expensive_query(&stmt, &plan, &self.config.thresholds());
        if level >= ExpensiveLevel::TooExpensive {
            return Err(CompileError::TooExpensive);
        }

        let cacheable = self.collaborators.cacheability.cacheable(&stmt);
        Ok(CompiledStatement {
            schema,
            plan,
            expensive: level > ExpensiveLevel::NotExpensive,
            cacheable,
            text: stmt.text().to_string(),
            statement: stmt,
            session: Arc::clone(&self.session),
        })
    }
}

/// Classifies `plan` and logs the statement when it is at least expensive.
fn log_expensive_query(stmt: &Statement, plan: &Plan, thresholds: &Thresholds) -> ExpensiveLevel {
    let level = query_expensive_level(plan, thresholds);
    debug!(%level, "plan classified");
    if level < ExpensiveLevel::Expensive {
        return level;
    }

    warn!("[EXPENSIVE_QUERY] {}", truncate_for_log(stmt.text()));
    level
}

/// Cuts `sql` to [`LOG_SQL_LEN`] bytes and records the full length.
pub fn truncate_for_log(sql: &str) -> Cow<'_, str> {
    if sql.len() <= LOG_SQL_LEN {
        return Cow::Borrowed(sql);
    }

    let mut end = LOG_SQL_LEN;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{} len({})", &sql[..end], sql.len()))
}
