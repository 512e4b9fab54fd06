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

//! Statement-type labels used for per-kind statement counts.

use tracing::trace;

use crate::ast::{Statement, StatementKind};
use crate::counters::StatementMetrics;

/// Label for statements that are deliberately left out of the counts.
pub const IGNORE_LABEL: &str = "IGNORE";

/// Label for statement kinds without a dedicated label.
pub const OTHER_LABEL: &str = "other";

/// Maps a statement to its counter label.
///
/// `USE` is frequent and says nothing about the workload, so it maps to
/// [`IGNORE_LABEL`] and is never counted.
pub fn statement_label(stmt: &Statement) -> &'static str {
    match stmt.kind() {
        StatementKind::AlterTable { .. } => "AlterTable",
        StatementKind::AnalyzeTable { .. } => "AnalyzeTable",
        StatementKind::Begin => "Begin",
        StatementKind::Commit => "Commit",
        StatementKind::CreateDatabase { .. } => "CreateDatabase",
        StatementKind::CreateIndex { .. } => "CreateIndex",
        StatementKind::CreateTable { .. } => "CreateTable",
        StatementKind::CreateUser { .. } => "CreateUser",
        StatementKind::Delete(_) => "Delete",
        StatementKind::DropDatabase { .. } => "DropDatabase",
        StatementKind::DropIndex { .. } => "DropIndex",
        StatementKind::DropTable { .. } => "DropTable",
        StatementKind::Explain { .. } => "Explain",
        StatementKind::Insert(insert) if insert.is_replace => "Replace",
        StatementKind::Insert(_) => "Insert",
        StatementKind::LoadData { .. } => "LoadData",
        StatementKind::Rollback => "RollBack",
        StatementKind::Select(_) => "Select",
        StatementKind::Set { .. } | StatementKind::SetPassword { .. } => "Set",
        StatementKind::Show { .. } => "Show",
        StatementKind::TruncateTable { .. } => "TruncateTable",
        StatementKind::Update(_) => "Update",
        StatementKind::Grant { .. } => "Grant",
        StatementKind::Revoke { .. } => "Revoke",
        StatementKind::Deallocate { .. } => "Deallocate",
        StatementKind::Execute { .. } => "Execute",
        StatementKind::Prepare { .. } => "Prepare",
        StatementKind::Use { .. } => IGNORE_LABEL,
        StatementKind::DropUser { .. } | StatementKind::RenameTable { .. } | StatementKind::Kill { .. } | StatementKind::Flush { .. } | StatementKind::Do { .. } => OTHER_LABEL,
    }
}

/// Records one statement of this kind, unless the engine issued it itself.
pub fn count_statement(metrics: &dyn StatementMetrics, stmt: &Statement, in_restricted_sql: bool) {
    if in_restricted_sql {
        return;
    }

    let label = statement_label(stmt);
    if label == IGNORE_LABEL {
        return;
    }

    trace!(label, "counting statement");
    metrics.increment_statement_counter(label);
}
