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

//! Physical plans as produced by the optimizer.

use serde::{Deserialize, Serialize};

/// Optimizer statistics attached to a plan node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsInfo {
    /// Estimated number of rows the node produces.
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Semi,
    AntiSemi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicalOperator {
    TableScan { table: String },
    IndexScan { table: String, index: String },
    PointGet { table: String },
    TableDual,
    Selection { conditions: Vec<String> },
    Projection { columns: Vec<String> },
    HashJoin { join_type: JoinType },
    MergeJoin { join_type: JoinType },
    IndexJoin { join_type: JoinType },
    HashAgg { group_by: Vec<String> },
    StreamAgg { group_by: Vec<String> },
    Sort { by: Vec<String> },
    TopN { count: u64, offset: u64 },
    Limit { count: u64, offset: u64 },
    Union,
}

/// A node of an executable plan tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPlan {
    pub operator: PhysicalOperator,
    pub stats: StatsInfo,
    #[serde(default)]
    pub children: Vec<PhysicalPlan>,
}

impl PhysicalPlan {
    pub fn new(operator: PhysicalOperator, estimated_rows: u64) -> Self {
        Self {
            operator,
            stats: StatsInfo { count: estimated_rows },
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: PhysicalPlan) -> Self {
        self.children.push(child);
        self
    }

    pub fn stats_info(&self) -> StatsInfo {
        self.stats
    }

    pub fn children(&self) -> &[PhysicalPlan] {
        &self.children
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl Drop for PhysicalPlan {
    // The derived drop recurses once per level; plans can be deeper than the stack allows.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// `EXECUTE` of a prepared statement; wraps the plan of the prepared body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutePlan {
    pub name: String,
    pub plan: Box<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertPlan {
    pub table: String,
    /// Present for `INSERT ... SELECT`, absent for `VALUES` inserts.
    pub select_plan: Option<PhysicalPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePlan {
    pub tables: Vec<String>,
    pub select_plan: Option<PhysicalPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlan {
    pub tables: Vec<String>,
    pub select_plan: Option<PhysicalPlan>,
}

/// The optimizer's output for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Plan {
    Physical(PhysicalPlan),
    Execute(ExecutePlan),
    Insert(InsertPlan),
    Delete(DeletePlan),
    Update(UpdatePlan),
    Explain { analyze: bool, target: Box<Plan> },
    Prepare { name: String },
    Deallocate { name: String },
    Ddl,
    /// Statements executed without a plan tree: transaction control, `SET`, `USE`, `SHOW`, ...
    Simple,
}

impl Plan {
    /// The data-sourcing sub-plan of an insert, delete or update.
    pub fn select_plan(&self) -> Option<&PhysicalPlan> {
        match self {
            Plan::Insert(insert) => insert.select_plan.as_ref(),
            Plan::Delete(delete) => delete.select_plan.as_ref(),
            Plan::Update(update) => update.select_plan.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_count() {
        let plan = PhysicalPlan::new(PhysicalOperator::HashJoin { join_type: JoinType::Inner }, 10)
            .with_child(PhysicalPlan::new(PhysicalOperator::TableScan { table: "a".to_string() }, 100))
            .with_child(
                PhysicalPlan::new(PhysicalOperator::Selection { conditions: vec!["b.x > 1".to_string()] }, 50)
                    .with_child(PhysicalPlan::new(PhysicalOperator::TableScan { table: "b".to_string() }, 500)),
            );
        assert_eq!(plan.node_count(), 4);
        assert_eq!(plan.children().len(), 2);
        assert_eq!(plan.stats_info().count, 10);
    }

    #[test]
    fn test_dropping_deep_plan() {
        let mut plan = PhysicalPlan::new(PhysicalOperator::TableScan { table: "t".to_string() }, 1);
        for _ in 0..200_000 {
            plan = PhysicalPlan::new(PhysicalOperator::Projection { columns: vec![] }, 1).with_child(plan);
        }
        assert_eq!(plan.node_count(), 200_001);
        drop(plan);
    }

    #[test]
    fn test_select_plan_accessor() {
        let scan = PhysicalPlan::new(PhysicalOperator::TableScan { table: "t".to_string() }, 5);
        let update = Plan::Update(UpdatePlan {
            tables: vec!["t".to_string()],
            select_plan: Some(scan.clone()),
        });
        assert_eq!(update.select_plan(), Some(&scan));

        let insert = Plan::Insert(InsertPlan {
            table: "t".to_string(),
            select_plan: None,
        });
        assert!(insert.select_plan().is_none());
        assert!(Plan::Physical(scan).select_plan().is_none());
    }

    #[test]
    fn test_plan_deserializes_without_children() {
        let json = r#"{"Physical":{"operator":"TableDual","stats":{"count":1}}}"#;
        let plan: Plan = serde_json::from_str(json).unwrap();
        assert_eq!(plan, Plan::Physical(PhysicalPlan::new(PhysicalOperator::TableDual, 1)));
    }
}
