//! Tree outline of the repository for tree views.

use crate::model::{Step, Tour, TourId};
use crate::repository::TourRepository;

/// Label of the root node.
pub const ROOT_LABEL: &str = "Code Tours";

/// One row of the tour tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Root,
    Tour(Tour),
    Step {
        tour_id: TourId,
        index: usize,
        step: Step,
    },
}

impl TreeNode {
    /// Nesting level: root 0, tours 1, steps 2.
    pub fn depth(&self) -> usize {
        match self {
            Self::Root => 0,
            Self::Tour(_) => 1,
            Self::Step { .. } => 2,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Root => ROOT_LABEL,
            Self::Tour(tour) => tour.title(),
            Self::Step { step, .. } => &step.title,
        }
    }
}

/// Pre-order outline: the root, then each tour followed by its steps.
pub fn outline(repo: &TourRepository) -> Vec<TreeNode> {
    let mut nodes = vec![TreeNode::Root];
    for tour in repo.list() {
        tracing::trace!(title = tour.title(), steps = tour.step_count(), "outlining tour");
        nodes.push(TreeNode::Tour(tour.clone()));
        nodes.extend(
            tour.steps()
                .iter()
                .enumerate()
                .map(|(index, step)| TreeNode::Step {
                    tour_id: tour.id(),
                    index,
                    step: step.clone(),
                }),
        );
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::StepDraft;

    #[test]
    fn outline_nests_steps_under_tours() {
        let mut repo = TourRepository::new();
        let a = Tour::new("A", "a.tour")
            .with_step(Step::from_draft(StepDraft::note("A1", "")))
            .with_step(Step::from_draft(StepDraft::note("A2", "")));
        let a_id = a.id();
        repo.insert(a).unwrap();
        repo.insert(Tour::new("B", "b.tour")).unwrap();

        let nodes = outline(&repo);
        let rows: Vec<(usize, &str)> = nodes.iter().map(|n| (n.depth(), n.label())).collect();
        assert_eq!(
            rows,
            [(0, ROOT_LABEL), (1, "A"), (2, "A1"), (2, "A2"), (1, "B")]
        );
        assert!(matches!(
            &nodes[3],
            TreeNode::Step { tour_id, index: 1, .. } if *tour_id == a_id
        ));
    }

    #[test]
    fn empty_repository_is_just_root() {
        assert_eq!(outline(&TourRepository::new()), vec![TreeNode::Root]);
    }
}
