use super::Location;

use std::collections::HashSet;

/// Forbids occupying `location` at `time_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexConstraint {
    pub time_step: usize,
    pub location: Location,
}

/// Forbids moving from `from` to `to` when leaving at `time_step`. The
/// reverse direction needs its own constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeConstraint {
    pub time_step: usize,
    pub from: Location,
    pub to: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Vertex(VertexConstraint),
    Edge(EdgeConstraint),
}

/// All constraints imposed on a single agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    vertex_constraints: HashSet<VertexConstraint>,
    edge_constraints: HashSet<EdgeConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the constraint was already present.
    pub fn insert(&mut self, constraint: Constraint) -> bool {
        match constraint {
            Constraint::Vertex(vertex) => self.vertex_constraints.insert(vertex),
            Constraint::Edge(edge) => self.edge_constraints.insert(edge),
        }
    }

    pub fn is_vertex_forbidden(&self, time_step: usize, location: Location) -> bool {
        self.vertex_constraints.contains(&VertexConstraint {
            time_step,
            location,
        })
    }

    pub fn is_edge_forbidden(&self, time_step: usize, from: Location, to: Location) -> bool {
        self.edge_constraints.contains(&EdgeConstraint {
            time_step,
            from,
            to,
        })
    }

    pub fn len(&self) -> usize {
        self.vertex_constraints.len() + self.edge_constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    /// Both agents stand on `location`.
    Occupation { location: Location },
    /// `agent_1` moves `from` -> `to` while `agent_2` moves `to` -> `from`.
    Swap { from: Location, to: Location },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conflict {
    pub agent_1: usize,
    pub agent_2: usize,
    pub time_step: usize,
    pub conflict_type: ConflictType,
}

impl Conflict {
    /// The constraint resolving this conflict for `agent_1` and for `agent_2`.
    pub fn constraints(&self) -> (Constraint, Constraint) {
        match self.conflict_type {
            ConflictType::Occupation { location } => {
                let vertex = Constraint::Vertex(VertexConstraint {
                    time_step: self.time_step,
                    location,
                });
                (vertex, vertex)
            }
            ConflictType::Swap { from, to } => (
                Constraint::Edge(EdgeConstraint {
                    time_step: self.time_step,
                    from,
                    to,
                }),
                Constraint::Edge(EdgeConstraint {
                    time_step: self.time_step,
                    from: to,
                    to: from,
                }),
            ),
        }
    }
}
