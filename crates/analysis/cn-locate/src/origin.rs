//! Where a function value came from

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Position hint for a literal closure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureOrigin {
    /// 1-based line of the `function` / `fn` keyword
    pub line: u32,
    /// 1-based line of the last token, narrows same-line candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    /// 1-based byte column where the closure starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ClosureOrigin {
    /// Hint for the closure starting on `line`
    pub fn at_line(line: u32) -> Self {
        Self {
            line,
            end_line: None,
            column: None,
        }
    }
}

/// A first-class callable reference such as `$obj->method(...)`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableReference {
    /// Declaring type, absent for plain functions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Member or function name
    pub member: String,
    /// Whether the reference was taken statically (`Owner::method(...)`),
    /// which only a static member allows
    #[serde(default)]
    pub is_static: bool,
    /// Whether the runtime reports the member as final
    #[serde(default)]
    pub is_final: bool,
}

impl CallableReference {
    /// Reference to a member of `owner`
    pub fn member(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            member: member.into(),
            is_static: false,
            is_final: false,
        }
    }

    /// Reference to a plain function
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            owner: None,
            member: name.into(),
            is_static: false,
            is_final: false,
        }
    }

    /// `Owner::member` or `function`
    pub fn display_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}::{}", self.member),
            None => self.member.clone(),
        }
    }
}

/// Origin of a function value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// A closure or arrow function written in source
    Closure(ClosureOrigin),
    /// A first-class callable reference to a named member
    Callable(CallableReference),
}

impl From<ClosureOrigin> for Origin {
    fn from(origin: ClosureOrigin) -> Self {
        Self::Closure(origin)
    }
}

impl From<CallableReference> for Origin {
    fn from(reference: CallableReference) -> Self {
        Self::Callable(reference)
    }
}

/// How a synthesized definition reaches the referenced member
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// No override can intercept the call
    #[display("direct")]
    Direct,
    /// The call goes through dynamic or late static binding
    #[display("late-bound")]
    LateBound,
}
