//! Built-in function identifiers
//!
//! Each kind of built-in has its own enumeration. Discriminants start at 1 so
//! that `0` can stand for "no such built-in" in [`TestFunc::id_of`] and
//! [`ExpandFunc::id_of`].

use super::signature::Arity;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

macro_rules! builtin_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident = $id:literal => ($text:literal, $arity:expr), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $( $variant = $id, )+
        }

        impl $name {
            /// Every built-in of this kind
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// Name used in project files
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }

            /// Accepted number of flattened arguments
            pub fn arity(self) -> Arity {
                match self {
                    $( $name::$variant => $arity, )+
                }
            }

            /// Numeric identifier, never zero
            pub fn id(self) -> u8 {
                self as u8
            }

            /// Resolve a name
            pub fn lookup(name: &str) -> Option<$name> {
                static TABLE: Lazy<FxHashMap<&'static str, $name>> = Lazy::new(|| {
                    $name::ALL.iter().map(|f| (f.name(), *f)).collect()
                });
                TABLE.get(name).copied()
            }

            /// Numeric identifier of a name, `0` when it is not a built-in
            pub fn id_of(name: &str) -> u8 {
                Self::lookup(name).map_or(0, Self::id)
            }
        }
    };
}

builtin_table! {
    /// Built-in test functions, usable as conditions
    pub enum TestFunc {
        Requires = 1 => ("requires", Arity::at_least(0)),
        GreaterThan = 2 => ("greaterThan", Arity::exactly(2)),
        LessThan = 3 => ("lessThan", Arity::exactly(2)),
        Equals = 4 => ("equals", Arity::exactly(2)),
        IsEqual = 5 => ("isEqual", Arity::exactly(2)),
        VersionAtLeast = 6 => ("versionAtLeast", Arity::exactly(2)),
        VersionAtMost = 7 => ("versionAtMost", Arity::exactly(2)),
        Exists = 8 => ("exists", Arity::exactly(1)),
        Export = 9 => ("export", Arity::exactly(1)),
        Clear = 10 => ("clear", Arity::exactly(1)),
        Unset = 11 => ("unset", Arity::exactly(1)),
        Eval = 12 => ("eval", Arity::exactly(1)),
        Config = 13 => ("CONFIG", Arity::range(1, 2)),
        If = 14 => ("if", Arity::exactly(1)),
        Load = 15 => ("load", Arity::range(1, 2)),
        Include = 16 => ("include", Arity::range(1, 3)),
        Debug = 17 => ("debug", Arity::exactly(2)),
        Log = 18 => ("log", Arity::exactly(1)),
        Message = 19 => ("message", Arity::exactly(1)),
        Warning = 20 => ("warning", Arity::exactly(1)),
        Error = 21 => ("error", Arity::range(0, 1)),
        Return = 22 => ("return", Arity::range(0, 1)),
        Break = 23 => ("break", Arity::exactly(0)),
        Next = 24 => ("next", Arity::exactly(0)),
        Defined = 25 => ("defined", Arity::range(1, 2)),
        Contains = 26 => ("contains", Arity::range(2, 3)),
        Count = 27 => ("count", Arity::range(2, 3)),
        IsEmpty = 28 => ("isEmpty", Arity::exactly(1)),
        Mkpath = 29 => ("mkpath", Arity::exactly(1)),
        WriteFile = 30 => ("write_file", Arity::range(1, 3)),
        Touch = 31 => ("touch", Arity::exactly(2)),
    }
}

builtin_table! {
    /// Built-in replace functions, usable as `$$name(...)`
    pub enum ExpandFunc {
        Member = 1 => ("member", Arity::range(1, 3)),
        First = 2 => ("first", Arity::exactly(1)),
        Last = 3 => ("last", Arity::exactly(1)),
        Size = 4 => ("size", Arity::exactly(1)),
        StrSize = 5 => ("str_size", Arity::exactly(1)),
        Cat = 6 => ("cat", Arity::range(1, 2)),
        Eval = 7 => ("eval", Arity::exactly(1)),
        List = 8 => ("list", Arity::at_least(0)),
        Sprintf = 9 => ("sprintf", Arity::at_least(1)),
        Join = 10 => ("join", Arity::range(1, 4)),
        Split = 11 => ("split", Arity::range(1, 2)),
        Basename = 12 => ("basename", Arity::exactly(1)),
        Dirname = 13 => ("dirname", Arity::exactly(1)),
        Section = 14 => ("section", Arity::range(3, 4)),
        Find = 15 => ("find", Arity::exactly(2)),
        Unique = 16 => ("unique", Arity::exactly(1)),
        Reverse = 17 => ("reverse", Arity::exactly(1)),
        Sorted = 18 => ("sorted", Arity::exactly(1)),
        TakeFirst = 19 => ("take_first", Arity::exactly(1)),
        TakeLast = 20 => ("take_last", Arity::exactly(1)),
        Quote = 21 => ("quote", Arity::at_least(0)),
        EscapeExpand = 22 => ("escape_expand", Arity::at_least(0)),
        Upper = 23 => ("upper", Arity::at_least(0)),
        Lower = 24 => ("lower", Arity::at_least(0)),
        Title = 25 => ("title", Arity::at_least(0)),
        ReEscape = 26 => ("re_escape", Arity::at_least(0)),
        ValEscape = 27 => ("val_escape", Arity::exactly(1)),
        Files = 28 => ("files", Arity::range(1, 2)),
        Replace = 29 => ("replace", Arity::exactly(3)),
        EnumerateVars = 30 => ("enumerate_vars", Arity::exactly(0)),
        AbsolutePath = 31 => ("absolute_path", Arity::range(1, 2)),
        RelativePath = 32 => ("relative_path", Arity::range(1, 2)),
        CleanPath = 33 => ("clean_path", Arity::exactly(1)),
        SystemPath = 34 => ("system_path", Arity::exactly(1)),
        ShellPath = 35 => ("shell_path", Arity::exactly(1)),
        Getenv = 36 => ("getenv", Arity::exactly(1)),
        NumAdd = 37 => ("num_add", Arity::at_least(0)),
    }
}
