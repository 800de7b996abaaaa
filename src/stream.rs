use tracing::trace;

use crate::state::{CandidateStack, State};

/// Outcome of one step of the explicit-stack search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// A pair was added and more query vertices remain.
    Deeper,
    /// A pair was added and every query vertex is mapped.
    Found,
    /// The most recent pair was undone.
    Backtrack,
    /// No candidates remain anywhere.
    Exhausted,
}

/// Lazily enumerates the complete mappings of a [`State`].
///
/// The recursion of a backtracking matcher is replaced by a [`CandidateStack`]
/// of the pairs currently added, so the search suspends after every mapping
/// and resumes from the deepest level on the next pull.
pub struct StateStream<S> {
    state: S,
    stack: CandidateStack,
    n: usize,
    m: Option<usize>,
    m_exhausted: bool,
    done: bool,
}

impl<S: State> StateStream<S> {
    pub fn new(state: S) -> Self {
        let n_max = state.n_max();
        let n = state.next_n(None).unwrap_or(n_max);
        Self {
            stack: CandidateStack::new(n_max),
            state,
            n,
            m: None,
            m_exhausted: false,
            done: false,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    fn step(&mut self) -> Step {
        let n_max = self.state.n_max();

        if self.n == n_max || self.m_exhausted {
            if self.stack.is_empty() {
                return Step::Exhausted;
            }
            let (n, m) = self.stack.pop();
            self.state.remove(n, m);
            self.n = n;
            self.m = Some(m);
            self.m_exhausted = false;
            return Step::Backtrack;
        }

        while let Some(m) = self.state.next_m(self.n, self.m) {
            self.m = Some(m);
            if self.state.add(self.n, m) {
                self.stack.push(self.n, m);
                self.n = self.state.next_n(None).unwrap_or(n_max);
                self.m = None;
                return if self.state.size() == n_max {
                    Step::Found
                } else {
                    Step::Deeper
                };
            }
        }

        self.m_exhausted = true;
        if self.stack.is_empty() {
            Step::Exhausted
        } else {
            Step::Backtrack
        }
    }
}

impl<S: State> Iterator for StateStream<S> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if self.state.n_max() == 0 {
            self.done = true;
            return Some(Vec::new());
        }
        loop {
            match self.step() {
                Step::Found => {
                    trace!(depth = self.stack.len(), "mapping found");
                    return Some(self.state.mapping());
                }
                Step::Exhausted => {
                    trace!("search exhausted");
                    self.done = true;
                    return None;
                }
                Step::Deeper | Step::Backtrack => {}
            }
        }
    }
}

impl<S: State> std::iter::FusedIterator for StateStream<S> {}
