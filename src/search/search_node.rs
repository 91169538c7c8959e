use std::rc::Rc;

/// A node of a search tree. Nodes share their ancestors, so extending a path
/// is cheap and the path is recovered by walking parent links.
#[derive(Debug)]
pub struct SearchNode<S, A> {
    state: S,
    /// Cost of the edge from the parent to this node
    edge_cost: f64,
    /// Cost of the whole path from the root to this node
    cumulative_cost: f64,
    parent: Option<Rc<SearchNode<S, A>>>,
    /// Action that led from the parent to this node
    action: Option<A>,
}

impl<S, A> SearchNode<S, A> {
    pub fn new_root(state: S) -> Self {
        Self {
            state,
            edge_cost: 0.,
            cumulative_cost: 0.,
            parent: None,
            action: None,
        }
    }

    pub fn new_child(parent: Rc<SearchNode<S, A>>, action: A, state: S, edge_cost: f64) -> Self {
        Self {
            state,
            edge_cost,
            cumulative_cost: parent.cumulative_cost + edge_cost,
            parent: Some(parent),
            action: Some(action),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn edge_cost(&self) -> f64 {
        self.edge_cost
    }

    pub fn cumulative_cost(&self) -> f64 {
        self.cumulative_cost
    }

    pub fn parent(&self) -> Option<&Rc<SearchNode<S, A>>> {
        self.parent.as_ref()
    }

    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl<S: Clone, A: Clone> SearchNode<S, A> {
    /// The states from the root to this node, and the actions between them.
    /// There is always one more state than there are actions.
    pub fn extract_path(&self) -> (Vec<S>, Vec<A>) {
        let mut states = vec![self.state.clone()];
        let mut actions = vec![];
        let mut current = self;
        while let Some(parent) = current.parent() {
            if let Some(action) = current.action() {
                actions.push(action.clone());
            }
            states.push(parent.state.clone());
            current = parent;
        }
        states.reverse();
        actions.reverse();
        (states, actions)
    }
}
