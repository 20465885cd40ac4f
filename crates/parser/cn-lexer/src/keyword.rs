//! Reserved and contextual keywords

use serde::{Deserialize, Serialize};

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// A keyword, matched case-insensitively
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub enum Keyword {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
        }

        impl Keyword {
            /// Looks up the keyword spelled by `word`, ignoring ASCII case
            pub fn from_word(word: &str) -> Option<Self> {
                $(
                    if word.eq_ignore_ascii_case($text) {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            /// Canonical lowercase spelling
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }
        }
    };
}

keywords! {
    Abstract => "abstract",
    And => "and",
    Array => "array",
    As => "as",
    Break => "break",
    Callable => "callable",
    Case => "case",
    Catch => "catch",
    Class => "class",
    Clone => "clone",
    Const => "const",
    Continue => "continue",
    Declare => "declare",
    Default => "default",
    Die => "die",
    Do => "do",
    Echo => "echo",
    Else => "else",
    Elseif => "elseif",
    Empty => "empty",
    Enddeclare => "enddeclare",
    Endfor => "endfor",
    Endforeach => "endforeach",
    Endif => "endif",
    Endswitch => "endswitch",
    Endwhile => "endwhile",
    Enum => "enum",
    Eval => "eval",
    Exit => "exit",
    Extends => "extends",
    Final => "final",
    Finally => "finally",
    Fn => "fn",
    For => "for",
    Foreach => "foreach",
    From => "from",
    Function => "function",
    Global => "global",
    Goto => "goto",
    HaltCompiler => "__halt_compiler",
    If => "if",
    Implements => "implements",
    Include => "include",
    IncludeOnce => "include_once",
    Instanceof => "instanceof",
    Insteadof => "insteadof",
    Interface => "interface",
    Isset => "isset",
    List => "list",
    Match => "match",
    Namespace => "namespace",
    New => "new",
    Or => "or",
    Print => "print",
    Private => "private",
    Protected => "protected",
    Public => "public",
    Readonly => "readonly",
    Require => "require",
    RequireOnce => "require_once",
    Return => "return",
    Static => "static",
    Switch => "switch",
    Throw => "throw",
    Trait => "trait",
    Try => "try",
    Unset => "unset",
    Use => "use",
    Var => "var",
    While => "while",
    Xor => "xor",
    Yield => "yield",
    MagicClass => "__class__",
    MagicDir => "__dir__",
    MagicFile => "__file__",
    MagicFunction => "__function__",
    MagicLine => "__line__",
    MagicMethod => "__method__",
    MagicNamespace => "__namespace__",
    MagicTrait => "__trait__",
}

impl Keyword {
    /// Modifiers that may precede a member or type declaration
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::Abstract
                | Self::Final
                | Self::Private
                | Self::Protected
                | Self::Public
                | Self::Readonly
                | Self::Static
                | Self::Var
        )
    }

    /// Words that are keywords only in one position and names everywhere
    /// else: `enum` before a declaration name, `from` after `yield`
    pub fn is_contextual(self) -> bool {
        matches!(self, Self::Enum | Self::From)
    }
}
