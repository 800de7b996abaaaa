/// Sentinel for an unassigned slot in a mapping array.
pub const UNMAPPED: usize = usize::MAX;

/// Search cursor for one (sub)graph isomorphism attempt.
///
/// Query vertices are `0..n_max()`, target vertices `0..m_max()`. Candidate
/// generators take the previous candidate (`None` to start) and return `None`
/// once exhausted. Pairs are added and removed in stack order; removing
/// anything but the most recent pair is a logic error.
pub trait State {
    fn n_max(&self) -> usize;

    fn m_max(&self) -> usize;

    /// Next query vertex to extend the mapping with.
    fn next_n(&self, prev: Option<usize>) -> Option<usize>;

    /// Next target vertex to try for query vertex `n`.
    fn next_m(&self, n: usize, prev: Option<usize>) -> Option<usize>;

    /// Tries to map `n` to `m`. Leaves the state untouched and returns false
    /// when the pair is infeasible.
    fn add(&mut self, n: usize, m: usize) -> bool;

    fn remove(&mut self, n: usize, m: usize);

    /// Copy of the query-to-target mapping, [`UNMAPPED`] where unassigned.
    fn mapping(&self) -> Vec<usize>;

    /// Number of mapped query vertices.
    fn size(&self) -> usize;
}

/// Fixed-capacity LIFO of the `(n, m)` pairs currently added to a [`State`].
#[derive(Debug, Clone)]
pub struct CandidateStack {
    ns: Vec<usize>,
    ms: Vec<usize>,
    capacity: usize,
}

impl CandidateStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            ns: Vec::with_capacity(capacity),
            ms: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, n: usize, m: usize) {
        assert!(self.ns.len() < self.capacity, "candidate stack overflow");
        self.ns.push(n);
        self.ms.push(m);
    }

    /// # Panics
    ///
    /// Panics when empty; a pop without a matching push means the
    /// backtracking discipline was broken.
    pub fn pop(&mut self) -> (usize, usize) {
        assert!(!self.ns.is_empty(), "candidate stack underflow");
        let n = self.ns.pop().expect("non-empty");
        let m = self.ms.pop().expect("parallel stacks");
        (n, m)
    }

    pub fn len(&self) -> usize {
        self.ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let mut stack = CandidateStack::new(3);
        stack.push(0, 5);
        stack.push(1, 7);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), (1, 7));
        assert_eq!(stack.pop(), (0, 5));
        assert!(stack.is_empty());
        assert_eq!(stack.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "candidate stack underflow")]
    fn underflow_panics() {
        CandidateStack::new(1).pop();
    }

    #[test]
    #[should_panic(expected = "candidate stack overflow")]
    fn overflow_panics() {
        let mut stack = CandidateStack::new(1);
        stack.push(0, 0);
        stack.push(1, 1);
    }
}
