use cly::tokens::TokenStream;
use cly::variables::{Boolean, File, Host, Integer, Keyword};
use cly::{Alias, Context, FromVars, GrammarBuilder, Group, Node, Parser, Vars};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Editor;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Shell {
    running: AtomicBool,
    debug: AtomicBool,
    level: AtomicI64,
}

#[derive(Debug, FromVars)]
struct PingArgs {
    host: cly::Value,
    #[cly(default = "4")]
    count: u32,
}

fn grammar() -> Result<Parser<Shell>, cly::GrammarError> {
    let grammar = GrammarBuilder::<Shell>::new()
        .child(
            Node::new("cat").help("Print files").child(
                Node::variable("files", File::new())
                    .help("File to print")
                    .traversals(0)
                    .child(Node::action(|vars: &Vars| {
                        let files: Vec<std::path::PathBuf> = vars.get("files")?;
                        for file in files {
                            print!("{}", std::fs::read_to_string(&file)?);
                        }
                        Ok(())
                    }))
                    .alias(Alias::new("..")),
            ),
        )
        .child(
            Node::new("ping").help("Pretend to ping a host").child(
                Node::variable("host", Host)
                    .help("Address or name")
                    .child(Node::typed_action(|args: PingArgs| {
                        println!("pinging {} {} times", args.host, args.count);
                        Ok(())
                    }))
                    .child(
                        Node::new("count")
                            .help("Number of requests")
                            .child(Node::variable("count", Integer).alias(Alias::new("../../../@0"))),
                    ),
            ),
        )
        .child(
            Node::new("set").help("Change settings").with_group(
                Group::new()
                    .child(
                        Node::new("level").child(
                            Node::variable("level", Integer)
                                .help("Verbosity level")
                                .child(Node::action_with_user(|shell: Option<&Shell>, vars: &Vars| {
                                    if let Some(shell) = shell {
                                        shell.level.store(vars.get("level")?, Ordering::SeqCst);
                                    }
                                    Ok(())
                                })),
                        ),
                    )
                    .child(
                        Node::new("debug").child(
                            Node::variable("enabled", Boolean)
                                .help("on or off")
                                .child(Node::action_with_user(|shell: Option<&Shell>, vars: &Vars| {
                                    if let Some(shell) = shell {
                                        shell.debug.store(vars.get("enabled")?, Ordering::SeqCst);
                                    }
                                    Ok(())
                                })),
                        ),
                    ),
            ),
        )
        .child(
            Node::new("show").help("Show state").child(
                Node::variable("what", Keyword)
                    .pattern("level|debug")
                    .fixed_candidates(["level", "debug"])
                    .help_with(|_| {
                        vec![
                            ("level".to_string(), "Verbosity level".to_string()),
                            ("debug".to_string(), "Debug switch".to_string()),
                        ]
                    })
                    .child(Node::action_with_context(|context: &Context<'_, Shell>| {
                        let what: String = context.vars().get("what")?;
                        if let Some(shell) = context.user() {
                            match what.as_str() {
                                "level" => println!("level {}", shell.level.load(Ordering::SeqCst)),
                                _ => println!("debug {}", shell.debug.load(Ordering::SeqCst)),
                            }
                        }
                        Ok(())
                    })),
            ),
        )
        .child(
            Node::new("resolve")
                .help("Look up an address")
                .condition(|context: &Context<'_, Shell>| {
                    context.user().map_or(false, |shell| shell.debug.load(Ordering::SeqCst))
                })
                .child(Node::variable("address", cly::variables::IpAddress).child(Node::action(
                    |vars: &Vars| {
                        let address: IpAddr = vars.get("address")?;
                        println!("{} is {}", address, if address.is_loopback() { "local" } else { "remote" });
                        Ok(())
                    },
                ))),
        )
        .child(
            Node::new("quit")
                .help("Leave the shell")
                .group(1)
                .child(Node::action_with_user(|shell: Option<&Shell>, _vars: &Vars| {
                    if let Some(shell) = shell {
                        shell.running.store(false, Ordering::SeqCst);
                    }
                    Ok(())
                })),
        )
        .build()?;
    Ok(Parser::new(grammar))
}

struct ShellHelper {
    parser: Arc<Parser<Shell>>,
    shell: Arc<Shell>,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        let (_, fragment) = TokenStream::new(line).split_trailing();
        let candidates = self
            .parser
            .complete_with(line, &self.shell)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.trim_end().to_string(),
                replacement: candidate,
            })
            .collect();
        Ok((pos - fragment.len(), candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl rustyline::Helper for ShellHelper {}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CLY_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let parser = match grammar() {
        Ok(parser) => Arc::new(parser),
        Err(err) => {
            eprintln!("Error: {}", err);
            return;
        }
    };
    let shell = Arc::new(Shell::default());
    shell.running.store(true, Ordering::SeqCst);

    let mut rl = Editor::<ShellHelper>::new();
    rl.set_helper(Some(ShellHelper {
        parser: Arc::clone(&parser),
        shell: Arc::clone(&shell),
    }));

    while shell.running.load(Ordering::SeqCst) {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        };
        rl.add_history_entry(line.as_str());

        if let Some(prefix) = line.strip_suffix('?') {
            print!("{}", parser.help_with(prefix, &shell).format());
            continue;
        }

        match parser.parse_with(&line, &shell) {
            Ok(context) if context.is_complete() => {}
            Ok(context) if context.remaining().is_empty() => {
                println!("Incomplete command, expected one of:");
                print!("{}", context.help().format());
            }
            Ok(context) => {
                println!("Unexpected input: {}", context.remaining());
                print!("{}", context.help().format());
            }
            Err(err) => println!("Error: {}", err),
        }
    }
}
