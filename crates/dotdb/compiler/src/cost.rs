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

//! Cost classification of physical plans.
//!
//! Every node of a plan tree is compared against the configured row-count
//! thresholds, not only the root: a small final result can sit on top of a
//! huge unfiltered scan. The level of a tree is the worst level found at any
//! of its nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::plan::{PhysicalPlan, Plan};

/// Severity of a plan, ordered from harmless to rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpensiveLevel {
    #[default]
    NotExpensive,
    Expensive,
    TooExpensive,
}

impl fmt::Display for ExpensiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpensiveLevel::NotExpensive => "not expensive",
            ExpensiveLevel::Expensive => "expensive",
            ExpensiveLevel::TooExpensive => "too expensive",
        };
        f.write_str(name)
    }
}

/// Row-count limits a plan node is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub expensive_rows: u64,
    /// Zero disables the hard cutoff.
    pub too_expensive_rows: u64,
}

impl Thresholds {
    pub fn new(expensive_rows: u64, too_expensive_rows: u64) -> Self {
        Self {
            expensive_rows,
            too_expensive_rows,
        }
    }

    pub fn hard_cutoff_enabled(&self) -> bool {
        self.too_expensive_rows > 0
    }

    /// Level of a single node, ignoring its children.
    pub fn node_level(&self, estimated_rows: u64) -> ExpensiveLevel {
        if self.hard_cutoff_enabled() && estimated_rows > self.too_expensive_rows {
            ExpensiveLevel::TooExpensive
        } else if estimated_rows > self.expensive_rows {
            ExpensiveLevel::Expensive
        } else {
            ExpensiveLevel::NotExpensive
        }
    }
}

/// Classifies whatever the optimizer produced for a statement.
pub fn query_expensive_level(plan: &Plan, thresholds: &Thresholds) -> ExpensiveLevel {
    match plan {
        Plan::Physical(physical) => physical_plan_expensive_level(physical, thresholds),
        Plan::Execute(execute) => query_expensive_level(&execute.plan, thresholds),
        Plan::Insert(_) | Plan::Delete(_) | Plan::Update(_) => match plan.select_plan() {
            Some(select) => physical_plan_expensive_level(select, thresholds),
            None => ExpensiveLevel::NotExpensive,
        },
        Plan::Explain { .. } | Plan::Prepare { .. } | Plan::Deallocate { .. } | Plan::Ddl | Plan::Simple => ExpensiveLevel::NotExpensive,
    }
}

/// Worst node level anywhere in the tree.
///
/// Walks with an explicit stack so that very deep plans cannot exhaust the
/// thread's stack.
pub fn physical_plan_expensive_level(plan: &PhysicalPlan, thresholds: &Thresholds) -> ExpensiveLevel {
    let mut level = ExpensiveLevel::NotExpensive;
    let mut stack = vec![plan];

    while let Some(node) = stack.pop() {
        level = level.max(thresholds.node_level(node.stats.count));
        if level == ExpensiveLevel::TooExpensive {
            break;
        }
        stack.extend(node.children.iter());
    }

    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{DeletePlan, ExecutePlan, InsertPlan, PhysicalOperator, UpdatePlan};
    use proptest::prelude::*;

    fn scan(rows: u64) -> PhysicalPlan {
        PhysicalPlan::new(PhysicalOperator::TableScan { table: "t".to_string() }, rows)
    }

    fn agg(rows: u64) -> PhysicalPlan {
        PhysicalPlan::new(PhysicalOperator::HashAgg { group_by: vec![] }, rows)
    }

    #[test]
    fn test_level_ordering() {
        assert!(ExpensiveLevel::NotExpensive < ExpensiveLevel::Expensive);
        assert!(ExpensiveLevel::Expensive < ExpensiveLevel::TooExpensive);
        assert_eq!(ExpensiveLevel::default(), ExpensiveLevel::NotExpensive);
        assert_eq!(ExpensiveLevel::TooExpensive.to_string(), "too expensive");
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        let thresholds = Thresholds::new(1000, 5000);
        assert_eq!(thresholds.node_level(1000), ExpensiveLevel::NotExpensive);
        assert_eq!(thresholds.node_level(1001), ExpensiveLevel::Expensive);
        assert_eq!(thresholds.node_level(5000), ExpensiveLevel::Expensive);
        assert_eq!(thresholds.node_level(5001), ExpensiveLevel::TooExpensive);
    }

    #[test]
    fn test_zero_hard_cutoff_is_disabled() {
        let thresholds = Thresholds::new(1000, 0);
        assert!(!thresholds.hard_cutoff_enabled());
        assert_eq!(thresholds.node_level(u64::MAX), ExpensiveLevel::Expensive);
        assert_eq!(physical_plan_expensive_level(&scan(u64::MAX), &thresholds), ExpensiveLevel::Expensive);
    }

    #[test]
    fn test_cheap_root_over_expensive_scan() {
        let thresholds = Thresholds::new(1000, 0);
        let plan = agg(1).with_child(scan(2_000_000));
        assert_eq!(physical_plan_expensive_level(&plan, &thresholds), ExpensiveLevel::Expensive);
    }

    #[test]
    fn test_dml_wrappers() {
        let thresholds = Thresholds::new(1000, 5000);

        let values_insert = Plan::Insert(InsertPlan {
            table: "t".to_string(),
            select_plan: None,
        });
        assert_eq!(query_expensive_level(&values_insert, &thresholds), ExpensiveLevel::NotExpensive);

        let insert_select = Plan::Insert(InsertPlan {
            table: "t".to_string(),
            select_plan: Some(scan(2000)),
        });
        assert_eq!(query_expensive_level(&insert_select, &thresholds), ExpensiveLevel::Expensive);

        let delete = Plan::Delete(DeletePlan {
            tables: vec!["t".to_string()],
            select_plan: Some(scan(10)),
        });
        assert_eq!(query_expensive_level(&delete, &thresholds), ExpensiveLevel::NotExpensive);

        let update = Plan::Update(UpdatePlan {
            tables: vec!["t".to_string()],
            select_plan: Some(agg(10).with_child(scan(6000))),
        });
        assert_eq!(query_expensive_level(&update, &thresholds), ExpensiveLevel::TooExpensive);
    }

    #[test]
    fn test_execute_unwraps_prepared_plan() {
        let thresholds = Thresholds::new(1000, 5000);
        let execute = Plan::Execute(ExecutePlan {
            name: "stmt1".to_string(),
            plan: Box::new(Plan::Physical(scan(1500))),
        });
        assert_eq!(query_expensive_level(&execute, &thresholds), ExpensiveLevel::Expensive);
    }

    #[test]
    fn test_unclassified_shapes() {
        let thresholds = Thresholds::new(0, 1);
        let explain = Plan::Explain {
            analyze: false,
            target: Box::new(Plan::Physical(scan(1_000_000))),
        };
        for plan in [explain, Plan::Ddl, Plan::Simple, Plan::Prepare { name: "p".to_string() }, Plan::Deallocate { name: "p".to_string() }] {
            assert_eq!(query_expensive_level(&plan, &thresholds), ExpensiveLevel::NotExpensive);
        }
    }

    #[test]
    fn test_deep_plan_does_not_overflow() {
        let thresholds = Thresholds::new(1000, 0);
        let mut plan = scan(1001);
        for _ in 0..100_000 {
            plan = PhysicalPlan::new(PhysicalOperator::Projection { columns: vec![] }, 1).with_child(plan);
        }
        assert_eq!(physical_plan_expensive_level(&plan, &thresholds), ExpensiveLevel::Expensive);
    }

    fn arb_plan() -> impl Strategy<Value = PhysicalPlan> {
        let leaf = (0u64..20_000).prop_map(scan);
        leaf.prop_recursive(5, 64, 4, |inner| {
            ((0u64..20_000), prop::collection::vec(inner, 0..4)).prop_map(|(rows, children)| {
                let mut node = agg(rows);
                node.children = children;
                node
            })
        })
    }

    fn arb_thresholds() -> impl Strategy<Value = Thresholds> {
        ((0u64..20_000), prop_oneof![Just(0u64), 0u64..20_000]).prop_map(|(expensive, too)| Thresholds::new(expensive, too))
    }

    fn max_node_level(plan: &PhysicalPlan, thresholds: &Thresholds) -> ExpensiveLevel {
        plan.children
            .iter()
            .map(|child| max_node_level(child, thresholds))
            .fold(thresholds.node_level(plan.stats.count), ExpensiveLevel::max)
    }

    proptest! {
        #[test]
        fn prop_tree_level_is_max_node_level(plan in arb_plan(), thresholds in arb_thresholds()) {
            prop_assert_eq!(physical_plan_expensive_level(&plan, &thresholds), max_node_level(&plan, &thresholds));
        }

        #[test]
        fn prop_adding_child_never_lowers_level(plan in arb_plan(), child in arb_plan(), thresholds in arb_thresholds()) {
            let before = physical_plan_expensive_level(&plan, &thresholds);
            let after = physical_plan_expensive_level(&plan.clone().with_child(child), &thresholds);
            prop_assert!(after >= before);
        }

        #[test]
        fn prop_disabled_cutoff_never_rejects(plan in arb_plan(), expensive in 0u64..20_000) {
            let thresholds = Thresholds::new(expensive, 0);
            prop_assert!(physical_plan_expensive_level(&plan, &thresholds) < ExpensiveLevel::TooExpensive);
        }
    }
}
