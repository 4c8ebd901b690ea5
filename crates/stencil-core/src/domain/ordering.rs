//! Dependency ordering of resolved types.
//!
//! Types are placed depth-first in declaration order: before a type is
//! emitted, every not-yet-placed dependency is emitted (recursively). Types
//! without dependencies therefore keep their declaration order and only
//! what has to move is moved. A dependency that is still in progress when
//! revisited closes a cycle, which is rejected.

use std::collections::HashMap;

use crate::domain::entities::resolved::{OrderedTypeSequence, ResolvedType};
use crate::domain::error::DomainError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Placement<'a> {
    types: &'a [ResolvedType],
    index: HashMap<&'a str, usize>,
    marks: Vec<Mark>,
    path: Vec<usize>,
    order: Vec<usize>,
}

/// Order `types` so that dependencies come first.
///
/// Dependencies naming types outside `types` are ignored.
pub fn order_types(
    namespace: &str,
    types: Vec<ResolvedType>,
) -> Result<OrderedTypeSequence, DomainError> {
    let order = {
        let mut placement = Placement {
            types: &types,
            index: types
                .iter()
                .enumerate()
                .map(|(i, t)| (t.name.as_str(), i))
                .collect(),
            marks: vec![Mark::Unvisited; types.len()],
            path: Vec::new(),
            order: Vec::with_capacity(types.len()),
        };

        for start in 0..types.len() {
            if let Err(cycle) = placement.visit(start) {
                return Err(DomainError::CyclicTypeDependency {
                    namespace: namespace.to_string(),
                    cycle,
                });
            }
        }
        placement.order
    };

    let mut slots: Vec<Option<ResolvedType>> = types.into_iter().map(Some).collect();
    let placed = order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    Ok(OrderedTypeSequence::from_ordered(placed))
}

impl Placement<'_> {
    /// Place `node` after its dependencies. Errors with the cycle `[a, ..., a]`.
    fn visit(&mut self, node: usize) -> Result<(), Vec<String>> {
        match self.marks[node] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let from = self.path.iter().position(|&n| n == node).unwrap_or(0);
                let mut cycle: Vec<String> = self.path[from..]
                    .iter()
                    .map(|&n| self.types[n].name.clone())
                    .collect();
                cycle.push(self.types[node].name.clone());
                return Err(cycle);
            }
            Mark::Unvisited => {}
        }

        self.marks[node] = Mark::InProgress;
        self.path.push(node);

        let types = self.types;
        for dep in &types[node].depends_on {
            if let Some(&next) = self.index.get(dep.as_str()) {
                self.visit(next)?;
            }
        }

        self.path.pop();
        self.marks[node] = Mark::Done;
        self.order.push(node);
        Ok(())
    }
}
