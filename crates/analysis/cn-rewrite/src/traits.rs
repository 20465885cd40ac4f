//! Facts about a closure gathered while rewriting it

use serde::{Deserialize, Serialize};

/// Binding requirements of a rewritten closure
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureTraits {
    /// Declared `static`, so it cannot bind `$this`
    pub is_static: bool,
    /// An `fn` arrow function
    pub is_arrow: bool,
    /// Refers to `$this`
    pub uses_this: bool,
    /// Refers to `self`, `static` or `parent`
    pub uses_scope: bool,
    /// Variables captured by the `use (…)` clause, `&`-prefixed when by reference
    pub captures: Vec<String>,
}
