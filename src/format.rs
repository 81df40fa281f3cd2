//! The `#3:2` save file format.
//!
//! This module only holds documentation; the grammar is implemented by
//! [`parser`](crate::parser) and rendered by [`ser`](crate::ser).
//!
//! # File Layout
//!
//! The first line is exactly `#3:2`. Every following line binds one variable:
//! a name, one or more whitespace characters, a value, optional trailing
//! whitespace and a newline. The file ends right after the last newline.
//!
//! ```text
//! #3:2
//! name "simple"
//! fraction 2.2
//! number 123
//! arr ({1,2,3,})
//! ```
//!
//! # Grammar
//!
//! ```text
//! SaveFile   := "#3:2" "\n" Line*
//! Line       := VarName WS+ Value WS* "\n"
//! VarName    := [a-zA-Z_][a-zA-Z0-9_]*
//! Value      := Number | String | Array | Mapping | Struct | LWObject | Closure | Ref
//! Number     := "-"? digits ("." digits)? (("e"|"E") "-"? digits)?
//! String     := '"' ( char except '"' '\' newline | "\" char except newline )* '"'
//! Closure    := "#'" VarName
//! Array      := "({" (Value ",")* "})"
//! Mapping    := "([" (Value ":" Value (";" Value)* ",")* "])"
//! Struct     := "(<" String "," (Value ",")* ">)"
//! LWObject   := "(*" String "," (Value ",")* "*)"
//! Ref        := "<" digits ">" ("=" Value)?
//! ```
//!
//! `WS` is any Unicode whitespace. The whitespace run after a value may span
//! several lines, so blank lines between bindings are accepted.
//!
//! # Values
//!
//! ## Numbers
//!
//! A lexeme containing `.`, `e` or `E` is a float, anything else an integer.
//! Integers beyond 64 bits are kept exactly as big integers. Floats are
//! always written with a fractional part or exponent, so `1.0` stays a float:
//!
//! ```text
//! i 123
//! f 1.0
//! e 2.5e-3
//! big 123456789012345678901234567890
//! ```
//!
//! ## Strings
//!
//! Inside quotes, `\n` is a newline, `\"` a quote and `\` followed by any other
//! character is that character. Writing escapes `\`, newline and `"` only.
//!
//! ```text
//! s "line one\nsays \"hi\" \\ bye"
//! ```
//!
//! ## Composites
//!
//! Every element is followed by a comma, the last one included. A mapping
//! entry may carry several values separated by `;`.
//!
//! ```text
//! arr ({1,"two",({}),})
//! map (["k":1,"multi":1;2;3,])
//! pos (<"position",10,20,>)
//! obj (*"/std/weapon","sword",*)
//! cb #'heart_beat
//! ```
//!
//! Structs and lightweight objects carry a description string followed by
//! positional fields; they load as a [`Record`](crate::Record).
//!
//! ## Back-references
//!
//! `<N>=value` anchors `value` under `N` and otherwise behaves as `value`
//! itself. A bare `<N>` refers to that anchor, which may appear anywhere in
//! the same file, before or after the reference:
//!
//! ```text
//! owner <1>=(*"/std/player","bob",*)
//! pet_owner <1>
//! ```
//!
//! Anchors are scoped to one file. Writing a document expands every
//! reference into a copy of its anchored value.
