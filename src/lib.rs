//! Grammar-driven parsing of interactive commands
//!
//! A [`Grammar`] is a tree of nodes describing the commands a program accepts. Literal nodes
//! match keywords, variable nodes convert a token into a typed [`Value`], and actions match the
//! end of the line and run a callback. [`Alias`]es add edges to other parts of the tree, which
//! makes optional and repeated arguments possible. The same grammar drives parsing, completion
//! of partially typed input and contextual help.
//!
//! ```
//! use cly::variables::Text;
//! use cly::{Alias, Grammar, Node, Parser, Vars};
//!
//! let grammar = Grammar::builder()
//!     .child(
//!         Node::new("cat").help("Print files").child(
//!             Node::variable("files", Text)
//!                 .traversals(0)
//!                 .child(Node::action(|vars: &Vars| {
//!                     let files: Vec<String> = vars.get("files")?;
//!                     assert_eq!(files, vec!["a.txt", "b.txt"]);
//!                     Ok(())
//!                 }))
//!                 .alias(Alias::new("..")),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//! let parser = Parser::new(grammar);
//!
//! let context = parser.parse("cat a.txt b.txt").unwrap();
//! assert!(context.is_complete());
//! assert_eq!(parser.complete("c").into_iter().collect::<Vec<_>>(), vec!["cat "]);
//! assert_eq!(parser.help("").pairs(), vec![("cat", "Print files")]);
//! ```
//!
//! Parsing never fails because of the input: if no path through the grammar reaches an action,
//! the returned [`Context`] is incomplete and tells how much of the input was matched.

mod completion;
mod context;
mod error;
mod grammar;
mod matcher;
mod parser;
pub mod tokens;
mod value;
pub mod variables;
mod vars;

#[cfg(test)]
mod testing;

pub use cly_derive::FromVars;
pub use completion::{HelpEntries, HelpEntry};
pub use context::Context;
pub use error::{ActionError, ArgumentError, BoxedError, GrammarError, ValueError};
pub use grammar::{
    cull_candidates, Alias, CallbackResult, Condition, Grammar, GrammarBuilder, Group, Help, Node,
    NodeId, NodeInfo, ACTION_GROUP,
};
pub use parser::{check, complete, help, parse, Parser};
pub use value::{FromValue, Network, Value};
pub use variables::VariableKind;
pub use vars::{FromVars, Vars};
