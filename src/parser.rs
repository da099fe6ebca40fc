use crate::completion::{self, HelpEntries};
use crate::context::Context;
use crate::error::ActionError;
use crate::grammar::{Grammar, NodeId};
use crate::matcher::match_tokens;
use crate::tokens::TokenStream;
use std::collections::BTreeSet;

/// Matches the input against the grammar without invoking any action.
pub fn check<'a, U>(grammar: &'a Grammar<U>, input: &'a str, user: Option<&'a U>) -> Context<'a, U> {
    let context = match_tokens(Context::new(grammar, TokenStream::new(input), user));
    tracing::debug!(
        input,
        parsed = context.cursor(),
        complete = context.is_complete(),
        "matched input"
    );
    context
}

/// Matches the input and, if it reaches an action, invokes the action's callback
///
/// Input that does not reach an action is not an error: the returned context is incomplete and
/// reports the part of the input that could not be matched. Errors returned by the callback are
/// passed to the caller unchanged.
pub fn parse<'a, U>(
    grammar: &'a Grammar<U>,
    input: &'a str,
    user: Option<&'a U>,
) -> Result<Context<'a, U>, ActionError> {
    let context = check(grammar, input, user);
    if context.is_complete() {
        context.execute()?;
    }
    Ok(context)
}

/// Contexts positioned after every complete token of the input, and the token being typed.
fn positions<'a, U>(
    grammar: &'a Grammar<U>,
    input: &'a str,
    user: Option<&'a U>,
) -> (Vec<Context<'a, U>>, &'a str) {
    let (tokens, fragment) = TokenStream::new(input).split_trailing();
    let found = completion::positions(Context::new(grammar, tokens, user));
    (found, fragment)
}

/// Completion candidates for the last token of the input
///
/// Every candidate replaces the token being typed (which is empty if the input ends with
/// whitespace). Candidates offered by several positions are returned once.
pub fn complete<U>(grammar: &Grammar<U>, input: &str, user: Option<&U>) -> BTreeSet<String> {
    let (found, fragment) = positions(grammar, input, user);
    let mut candidates = BTreeSet::new();
    for context in &found {
        completion::collect_candidates(context, fragment, &mut candidates);
    }
    tracing::debug!(
        input,
        positions = found.len(),
        candidates = candidates.len(),
        "completed input"
    );
    candidates
}

/// Help for what can be typed at the end of the input.
pub fn help<U>(grammar: &Grammar<U>, input: &str, user: Option<&U>) -> HelpEntries {
    let (found, fragment) = positions(grammar, input, user);
    let mut entries = HelpEntries::default();
    for context in &found {
        completion::collect_help(context, fragment, &mut entries);
    }
    tracing::debug!(input, positions = found.len(), entries = entries.len(), "collected help");
    entries
}

/// A grammar ready to process input lines
///
/// The parser owns the grammar and never modifies it, so it can be shared between threads and
/// used for any number of parses at once.
///
/// ```
/// use cly::{Grammar, Node, Parser};
///
/// let parser = Parser::new(
///     Grammar::builder()
///         .child(Node::new("quit").child(Node::action(|_| Ok(()))))
///         .build()
///         .unwrap(),
/// );
/// assert!(parser.parse("quit").unwrap().is_complete());
/// assert_eq!(parser.check("qui").parsed(), "");
/// assert!(parser.complete("q").contains("quit "));
/// ```
pub struct Parser<U = ()> {
    grammar: Grammar<U>,
}

impl<U> Parser<U> {
    pub fn new(grammar: Grammar<U>) -> Self {
        Parser { grammar }
    }

    pub fn grammar(&self) -> &Grammar<U> {
        &self.grammar
    }

    /// Finds a node by its absolute path or label.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.grammar.find(path)
    }

    pub fn check<'a>(&'a self, input: &'a str) -> Context<'a, U> {
        check(&self.grammar, input, None)
    }

    pub fn check_with<'a>(&'a self, input: &'a str, user: &'a U) -> Context<'a, U> {
        check(&self.grammar, input, Some(user))
    }

    pub fn parse<'a>(&'a self, input: &'a str) -> Result<Context<'a, U>, ActionError> {
        parse(&self.grammar, input, None)
    }

    /// Parses the input, passing `user` to conditions, callbacks and candidate sources.
    pub fn parse_with<'a>(&'a self, input: &'a str, user: &'a U) -> Result<Context<'a, U>, ActionError> {
        parse(&self.grammar, input, Some(user))
    }

    pub fn complete(&self, input: &str) -> BTreeSet<String> {
        complete(&self.grammar, input, None)
    }

    pub fn complete_with(&self, input: &str, user: &U) -> BTreeSet<String> {
        complete(&self.grammar, input, Some(user))
    }

    pub fn help(&self, input: &str) -> HelpEntries {
        help(&self.grammar, input, None)
    }

    pub fn help_with(&self, input: &str, user: &U) -> HelpEntries {
        help(&self.grammar, input, Some(user))
    }
}

impl<U> From<Grammar<U>> for Parser<U> {
    fn from(grammar: Grammar<U>) -> Self {
        Parser::new(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_complete, test_parse};
    use crate::variables::{Boolean, File, Integer, Text, Word};
    use crate::{Alias, FromVars, Node, Value, Vars};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn noop() -> Node {
        Node::action(|_| Ok(()))
    }

    fn quit() -> Grammar {
        Grammar::builder()
            .child(Node::new("quit").child(noop()))
            .build()
            .unwrap()
    }

    fn cat() -> Grammar {
        Grammar::builder()
            .child(Node::new("cat").child(Node::variable("file", Text).child(noop())))
            .build()
            .unwrap()
    }

    fn cat_many() -> Grammar {
        Grammar::builder()
            .child(
                Node::new("cat").child(
                    Node::variable("files", Text)
                        .traversals(0)
                        .child(noop())
                        .alias(Alias::new("..")),
                ),
            )
            .build()
            .unwrap()
    }

    mod matching {
        use super::*;

        test_parse!(quit_complete, quit(), "quit" => Complete { parsed: "quit" });
        test_parse!(quit_prefix, quit(), "qui" => Incomplete { parsed: "", remaining: "qui" });
        test_parse!(quit_trailing, quit(), "quit now" => Incomplete { parsed: "quit ", remaining: "now" });
        test_parse!(cat_file, cat(), "cat report.txt" => Complete { parsed: "cat report.txt", "file": "report.txt" });
        test_parse!(cat_missing_file, cat(), "cat" => Incomplete { parsed: "cat", remaining: "" });
        test_parse!(cat_many_files, cat_many(), "cat a.txt b.txt" => Complete {
            parsed: "cat a.txt b.txt",
            "files": vec!["a.txt", "b.txt"],
        });
        test_parse!(cat_one_of_many, cat_many(), "cat a.txt" => Complete { parsed: "cat a.txt", "files": vec!["a.txt"] });
    }

    mod completion {
        use super::*;

        test_complete!(root, cat_many(), "c" => ["cat "]);
        test_complete!(nothing_matches, cat_many(), "d" => []);
        test_complete!(free_text_has_none, cat_many(), "cat " => []);
    }

    #[test]
    fn parsed_and_remaining_cover_input() {
        let grammars = [quit(), cat(), cat_many()];
        let inputs = ["", "  ", "quit", "quit  now ", "cat", "cat a b c", "  cat  'x y'  z", "zzz"];
        for grammar in &grammars {
            for input in inputs {
                let context = check(grammar, input, None);
                assert_eq!(
                    context.parsed().len() + context.remaining().len(),
                    input.len(),
                    "input {:?}",
                    input
                );
            }
        }
    }

    #[test]
    fn completed_candidates_match() {
        let grammar = Grammar::builder()
            .child(
                Node::new("debug")
                    .child(Node::variable("flag", Boolean).pattern("on|off|true").child(noop())),
            )
            .child(
                Node::new("show")
                    .child(Node::new("ip").child(noop()))
                    .child(Node::new("interfaces").child(noop()))
                    .child(Node::new("version").pattern("ver(sion)?").child(noop())),
            )
            .child(
                Node::new("colour").child(
                    Node::variable("name", Word)
                        .fixed_candidates(["red", "dark-green", "blue"])
                        .child(noop()),
                ),
            )
            .child(
                Node::new("count")
                    .child(Node::variable("n", Integer).traversals(3).alias(Alias::new(".."))),
            )
            .build()
            .unwrap();

        let inputs = [
            "", "d", "debug ", "debug t", "show ", "show i", "colour ", "count 1 ", "count 1 2 3 ",
        ];
        for input in inputs {
            let (_, fragment) = TokenStream::new(input).split_trailing();
            let prefix = &input[..input.len() - fragment.len()];
            for candidate in complete(&grammar, input, None) {
                if !candidate.ends_with(' ') {
                    continue;
                }
                let line = format!("{}{}", prefix, candidate);
                let tokens = TokenStream::new(&line).len();
                let context = check(&grammar, &line, None);
                assert_eq!(context.consumed(), tokens, "{:?} completed to {:?}", input, line);
            }
        }
        assert_eq!(
            complete(&grammar, "debug ", None).into_iter().collect::<Vec<_>>(),
            vec!["true "]
        );
        assert_eq!(
            complete(&grammar, "colour ", None).into_iter().collect::<Vec<_>>(),
            vec!["blue ", "red "]
        );
    }

    #[test]
    fn single_traversal_is_recorded_once() {
        let grammar = cat();
        let context = check(&grammar, "cat x", None);
        let file = grammar.find("/cat/file").unwrap();
        assert_eq!(context.history().iter().filter(|&&id| id == file).count(), 1);
        assert_eq!(context.vars().value("file"), Some(&Value::from("x")));
    }

    #[test]
    fn callbacks_receive_variables() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let parser = Parser::new(
            Grammar::builder()
                .child(
                    Node::new("cat").child(
                        Node::variable("files", Text)
                            .traversals(0)
                            .child(Node::action(move |vars: &Vars| {
                                let files: Vec<String> = vars.get("files")?;
                                sink.lock().unwrap().extend(files);
                                Ok(())
                            }))
                            .alias(Alias::new("..")),
                    ),
                )
                .build()
                .unwrap(),
        );
        parser.parse("cat a b").unwrap();
        parser.parse("cat").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn callback_errors_propagate() {
        let parser = Parser::new(
            Grammar::builder()
                .child(Node::new("fail").child(Node::action(|_| Err("disk full".into()))))
                .build()
                .unwrap(),
        );
        match parser.parse("fail") {
            Err(ActionError::Callback(error)) => assert_eq!(error.to_string(), "disk full"),
            other => panic!("expected a callback error, found {:?}", other),
        }
    }

    #[test]
    fn argument_errors() {
        struct Args {
            count: i64,
        }

        impl FromVars for Args {
            fn from_vars(vars: &Vars) -> Result<Self, crate::ArgumentError> {
                Ok(Args {
                    count: vars.get("count")?,
                })
            }
        }

        let parser = Parser::new(
            Grammar::builder()
                .child(
                    Node::new("repeat")
                        .child(Node::variable("count", Integer).child(Node::typed_action(|args: Args| {
                            assert!(args.count > 0);
                            Ok(())
                        })))
                        .child(Node::typed_action(|_args: Args| Ok(()))),
                )
                .build()
                .unwrap(),
        );
        assert!(parser.parse("repeat 3").is_ok());
        assert!(matches!(
            parser.parse("repeat"),
            Err(ActionError::Arguments(crate::ArgumentError::Missing(name))) if name == "count"
        ));
    }

    #[test]
    fn user_object() {
        struct Session {
            admin: bool,
            calls: AtomicUsize,
        }

        let parser = Parser::new(
            crate::GrammarBuilder::<Session>::new()
                .child(
                    Node::new("reboot")
                        .condition(|context: &Context<'_, Session>| {
                            context.user().map_or(false, |session| session.admin)
                        })
                        .child(Node::action_with_user(|session: Option<&Session>, _vars: &Vars| {
                            if let Some(session) = session {
                                session.calls.fetch_add(1, Ordering::SeqCst);
                            }
                            Ok(())
                        })),
                )
                .build()
                .unwrap(),
        );

        let admin = Session {
            admin: true,
            calls: AtomicUsize::new(0),
        };
        let guest = Session {
            admin: false,
            calls: AtomicUsize::new(0),
        };
        assert!(parser.parse_with("reboot", &admin).unwrap().is_complete());
        assert!(!parser.parse_with("reboot", &guest).unwrap().is_complete());
        assert!(!parser.parse("reboot").unwrap().is_complete());
        assert_eq!(admin.calls.load(Ordering::SeqCst), 1);
        assert_eq!(guest.calls.load(Ordering::SeqCst), 0);
        assert!(parser.complete_with("r", &admin).contains("reboot "));
        assert!(parser.complete_with("r", &guest).is_empty());
    }

    #[test]
    fn context_callbacks() {
        let parser = Parser::new(
            Grammar::builder()
                .child(
                    Node::new("where").child(Node::action_with_context(|context| {
                        assert_eq!(context.parsed(), "where");
                        assert_eq!(context.history().len(), 1);
                        Ok(())
                    })),
                )
                .build()
                .unwrap(),
        );
        assert!(parser.parse("where").unwrap().is_complete());
    }

    #[test]
    fn help_through_parser() {
        let parser = Parser::new(
            Grammar::builder()
                .child(Node::new("cat").help("Print files").child(
                    Node::variable("file", File::new()).help("File to print").child(noop()),
                ))
                .build()
                .unwrap(),
        );
        assert_eq!(parser.help("").pairs(), vec![("cat", "Print files")]);
        assert_eq!(parser.help("cat ").pairs(), vec![("<file>", "File to print")]);

        let context = parser.check("cat");
        assert_eq!(context.help().pairs(), vec![("<file>", "File to print")]);
    }

    #[test]
    fn find_by_path() {
        let parser = Parser::from(cat());
        let file = parser.find("/cat/file").unwrap();
        assert_eq!(parser.grammar().node(file).var_name(), "file");
        assert_eq!(parser.find("/dog"), None);
    }
}
