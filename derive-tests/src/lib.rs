#[cfg(test)]
mod tests {
    use cly::variables::{Integer, Text};
    use cly::{ActionError, Alias, ArgumentError, FromVars, Grammar, Node, Parser, Value, Vars};
    use std::net::IpAddr;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq, FromVars)]
    struct CopyArgs {
        source: String,
        #[cly(rename = "dest")]
        destination: String,
        #[cly(default)]
        force: bool,
        #[cly(default = "3")]
        retries: i64,
    }

    #[derive(Debug, PartialEq, FromVars)]
    struct Many {
        files: Vec<String>,
        limit: Option<u16>,
    }

    #[derive(Debug, PartialEq, FromVars)]
    struct Quit;

    #[derive(Debug, PartialEq, FromVars)]
    struct Ping {
        host: IpAddr,
    }

    fn vars<const N: usize>(items: [(&str, Value); N]) -> Vars {
        items.into_iter().collect()
    }

    mod from_vars {
        use super::*;

        #[test]
        fn required_and_defaulted() {
            let parsed = CopyArgs::from_vars(&vars([
                ("source", Value::from("a.txt")),
                ("dest", Value::from("b.txt")),
            ]));
            assert_eq!(
                parsed,
                Ok(CopyArgs {
                    source: "a.txt".to_string(),
                    destination: "b.txt".to_string(),
                    force: false,
                    retries: 3,
                })
            );
        }

        #[test]
        fn defaults_are_overridden() {
            let parsed = CopyArgs::from_vars(&vars([
                ("source", Value::from("a")),
                ("dest", Value::from("b")),
                ("force", Value::Bool(true)),
                ("retries", Value::Int(7)),
            ]))
            .unwrap();
            assert!(parsed.force);
            assert_eq!(parsed.retries, 7);
        }

        #[test]
        fn missing_required() {
            let parsed = CopyArgs::from_vars(&vars([("source", Value::from("a"))]));
            assert_eq!(parsed, Err(ArgumentError::Missing("dest".to_string())));
        }

        #[test]
        fn type_mismatch() {
            let parsed = Ping::from_vars(&vars([("host", Value::Int(1))]));
            assert!(matches!(parsed, Err(ArgumentError::Mismatch { name, .. }) if name == "host"));
        }

        #[test]
        fn sequences_and_options() {
            assert_eq!(
                Many::from_vars(&Vars::new()),
                Ok(Many {
                    files: Vec::new(),
                    limit: None,
                })
            );
            assert_eq!(
                Many::from_vars(&vars([
                    ("files", Value::from(vec!["a", "b"])),
                    ("limit", Value::Int(5)),
                ])),
                Ok(Many {
                    files: vec!["a".to_string(), "b".to_string()],
                    limit: Some(5),
                })
            );
        }

        #[test]
        fn unit_struct() {
            assert_eq!(Quit::from_vars(&Vars::new()), Ok(Quit));
        }
    }

    mod typed_actions {
        use super::*;

        #[test]
        fn action_receives_struct() {
            let seen = Arc::new(Mutex::new(None));
            let sink = Arc::clone(&seen);
            let parser = Parser::new(
                Grammar::builder()
                    .child(
                        Node::new("cat").child(
                            Node::variable("files", Text)
                                .traversals(0)
                                .child(
                                    Node::new("limit").child(
                                        Node::variable("limit", Integer)
                                            .child(Node::typed_action(move |many: Many| {
                                                *sink.lock().unwrap() = Some(many);
                                                Ok(())
                                            })),
                                    ),
                                )
                                .alias(Alias::new("..")),
                        ),
                    )
                    .build()
                    .unwrap(),
            );

            assert!(parser.parse("cat a b limit 10").unwrap().is_complete());
            assert_eq!(
                *seen.lock().unwrap(),
                Some(Many {
                    files: vec!["a".to_string(), "b".to_string()],
                    limit: Some(10),
                })
            );
        }

        #[test]
        fn conversion_failure_is_reported() {
            let parser = Parser::new(
                Grammar::builder()
                    .child(
                        Node::new("limit").child(
                            Node::variable("limit", Integer).child(Node::typed_action(|_: Many| Ok(()))),
                        ),
                    )
                    .build()
                    .unwrap(),
            );
            match parser.parse("limit 100000") {
                Err(ActionError::Arguments(ArgumentError::Mismatch { name, .. })) => {
                    assert_eq!(name, "limit")
                }
                other => panic!("expected an argument error, found {:?}", other),
            }
        }
    }
}
