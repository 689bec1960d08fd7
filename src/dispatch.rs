//! Explicit command table and prefix dispatcher.
//!
//! Commands are registered in one table (name, arity, usage, handler) rather
//! than picked up ambiently; the gateway hands every message here.

use futures_util::future::BoxFuture;
use tracing::{debug, error};

use crate::commands::{roles, scholars, CommandContext};
use crate::error::Result;

type Handler = for<'a> fn(&'a CommandContext, &'a [String]) -> BoxFuture<'a, Result<()>>;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    run: Handler,
}

fn run_add_scholar<'a>(ctx: &'a CommandContext, args: &'a [String]) -> BoxFuture<'a, Result<()>> {
    Box::pin(scholars::add_scholar(ctx, args))
}

fn run_del_scholar<'a>(ctx: &'a CommandContext, args: &'a [String]) -> BoxFuture<'a, Result<()>> {
    Box::pin(scholars::del_scholar(ctx, args))
}

fn run_top_scholars<'a>(ctx: &'a CommandContext, args: &'a [String]) -> BoxFuture<'a, Result<()>> {
    Box::pin(scholars::top_scholars(ctx, args))
}

fn run_add_role<'a>(ctx: &'a CommandContext, args: &'a [String]) -> BoxFuture<'a, Result<()>> {
    Box::pin(roles::add_role(ctx, args))
}

fn run_del_role<'a>(ctx: &'a CommandContext, args: &'a [String]) -> BoxFuture<'a, Result<()>> {
    Box::pin(roles::del_role(ctx, args))
}

/// The full command table.
pub fn command_table() -> Vec<Command> {
    vec![
        Command {
            name: "addscholar",
            usage: "addscholar <ronin> [name]",
            min_args: 1,
            max_args: 2,
            run: run_add_scholar,
        },
        Command {
            name: "delscholar",
            usage: "delscholar <ronin-or-name>",
            min_args: 1,
            max_args: 1,
            run: run_del_scholar,
        },
        Command {
            name: "topscholars",
            usage: "topscholars",
            min_args: 0,
            max_args: 0,
            run: run_top_scholars,
        },
        Command {
            name: "addrole",
            usage: "addrole [user] <role>",
            min_args: 1,
            max_args: 2,
            run: run_add_role,
        },
        Command {
            name: "delrole",
            usage: "delrole [user] <role>",
            min_args: 1,
            max_args: 2,
            run: run_del_role,
        },
    ]
}

pub struct Dispatcher {
    prefix: String,
    commands: Vec<Command>,
}

impl Dispatcher {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            commands: command_table(),
        }
    }

    /// Handle one message. Non-prefixed content and unknown commands are
    /// ignored; handler failures are logged, never propagated.
    pub async fn dispatch(&self, ctx: &CommandContext, content: &str) {
        let Some(rest) = content.strip_prefix(&self.prefix) else {
            return;
        };
        let mut parts = split_args(rest);
        if parts.is_empty() {
            return;
        }
        let name = parts.remove(0);

        let Some(command) = self.commands.iter().find(|c| c.name == name) else {
            debug!(command = %name, "unknown command ignored");
            return;
        };

        if parts.len() < command.min_args || parts.len() > command.max_args {
            let usage = format!("Usage: {}{}", self.prefix, command.usage);
            if let Err(e) = ctx.reply(&usage).await {
                error!(command = %name, error = %e, "failed to send usage message");
            }
            return;
        }

        if let Err(e) = (command.run)(ctx, &parts).await {
            error!(command = %name, error = %e, "command handler failed");
            if let Err(e) = ctx.reply("Something went wrong while running the command.").await {
                error!(command = %name, error = %e, "failed to send error message");
            }
        }
    }
}

/// Whitespace splitting with double-quote grouping, so multi-word display
/// names can be passed as one argument.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut saw_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                saw_quotes = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || saw_quotes {
                    args.push(std::mem::take(&mut current));
                    saw_quotes = false;
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || saw_quotes {
        args.push(current);
    }
    args
}
