//! By-name solver dispatch
//!
//! The registry is an explicit value constructed at startup and passed by
//! reference to whatever selects a solver; there is no ambient global.

use std::collections::HashMap;

use matrix::Matrix;
use nanoforge_trace::TraceSink;

use crate::{flood_fill_solve, SolverError};

/// A solver derives a complete trace for `target` into the sink; `source`
/// is present only for reconstruction builds.
pub type SolverFn =
    Box<dyn Fn(Option<&Matrix>, &Matrix, &mut dyn TraceSink) -> Result<(), SolverError>>;

#[derive(Default)]
pub struct SolverRegistry {
    solvers: HashMap<String, SolverFn>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in solvers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("bfs", Box::new(flood_fill_solve));
        registry
    }

    pub fn register(&mut self, id: impl Into<String>, solver: SolverFn) {
        self.solvers.insert(id.into(), solver);
    }

    pub fn get(&self, id: &str) -> Option<&SolverFn> {
        self.solvers.get(id)
    }

    /// Registered solver ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.solvers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Looks up and runs a solver.
    pub fn run(
        &self,
        id: &str,
        source: Option<&Matrix>,
        target: &Matrix,
        sink: &mut dyn TraceSink,
    ) -> Result<(), SolverError> {
        let solver = self
            .get(id)
            .ok_or_else(|| SolverError::UnknownSolver(id.to_string()))?;
        solver(source, target, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_listed() {
        let registry = SolverRegistry::with_builtins();
        assert_eq!(registry.ids(), vec!["bfs"]);
        assert!(registry.get("bfs").is_some());
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let registry = SolverRegistry::with_builtins();
        let target = Matrix::new(3);
        let mut sink = nanoforge_trace::Recorder::new();
        let err = registry
            .run("divide", None, &target, &mut sink)
            .unwrap_err();
        assert!(matches!(err, SolverError::UnknownSolver(id) if id == "divide"));
    }
}
