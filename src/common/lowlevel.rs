use super::Location;

use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LowLevelOpenNode {
    pub(crate) position: Location,
    pub(crate) f_open_cost: usize,
    pub(crate) g_cost: usize,
    pub(crate) time_step: usize, // unit cost moves, so time step equals g cost
}

impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_open_cost
            .cmp(&other.f_open_cost)
            // Higher g cost (deeper node) has higher priority
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.position.cmp(&other.position))
            .then_with(|| self.time_step.cmp(&other.time_step))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn node(f: usize, g: usize, x: usize) -> LowLevelOpenNode {
        LowLevelOpenNode {
            position: Location::new(x, 0),
            f_open_cost: f,
            g_cost: g,
            time_step: g,
        }
    }

    #[test]
    fn test_open_order() {
        let mut open = BTreeSet::new();
        open.insert(node(5, 1, 0));
        open.insert(node(4, 1, 3));
        open.insert(node(4, 2, 2));
        open.insert(node(4, 2, 1));

        assert_eq!(open.pop_first(), Some(node(4, 2, 1)));
        assert_eq!(open.pop_first(), Some(node(4, 2, 2)));
        assert_eq!(open.pop_first(), Some(node(4, 1, 3)));
        assert_eq!(open.pop_first(), Some(node(5, 1, 0)));
    }
}
