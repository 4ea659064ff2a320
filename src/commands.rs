//! Ban commands
//!
//! Text commands for toggling and listing bans. Each command maps onto one
//! purpose; the table below is the whole command surface.

use crate::Data;
use crate::logging;
use crate::registry::{BanError, Purpose, ToggleOutcome};
use derive_more::Display;

/// Who may run a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Elevated,
    Anyone,
}

/// What a command does with its purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Toggle,
    List,
}

/// Static description of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub purpose: Purpose,
    pub kind: CommandKind,
    pub permission: Permission,
}

impl CommandSpec {
    /// Number of arguments the command takes
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self.kind {
            CommandKind::Toggle => 1,
            CommandKind::List => 0,
        }
    }

    #[must_use]
    pub fn usage(&self) -> String {
        match self.kind {
            CommandKind::Toggle => format!("/{} <material>", self.name),
            CommandKind::List => format!("/{}", self.name),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

pub const COMMANDS: [CommandSpec; 6] = [
    CommandSpec {
        name: "ban-craft",
        aliases: &["bancraft"],
        purpose: Purpose::Crafting,
        kind: CommandKind::Toggle,
        permission: Permission::Elevated,
    },
    CommandSpec {
        name: "ban-smelt",
        aliases: &["bansmelt"],
        purpose: Purpose::Smelting,
        kind: CommandKind::Toggle,
        permission: Permission::Elevated,
    },
    CommandSpec {
        name: "ban-fuel",
        aliases: &["banfuel"],
        purpose: Purpose::SmeltFueling,
        kind: CommandKind::Toggle,
        permission: Permission::Elevated,
    },
    CommandSpec {
        name: "list-banned-craft",
        aliases: &["bannedcraftlist"],
        purpose: Purpose::Crafting,
        kind: CommandKind::List,
        permission: Permission::Anyone,
    },
    CommandSpec {
        name: "list-banned-smelt",
        aliases: &["bannedsmeltlist"],
        purpose: Purpose::Smelting,
        kind: CommandKind::List,
        permission: Permission::Anyone,
    },
    CommandSpec {
        name: "list-banned-fuel",
        aliases: &["bannedfuellist"],
        purpose: Purpose::SmeltFueling,
        kind: CommandKind::List,
        permission: Permission::Anyone,
    },
];

/// Look up a command by name or alias
#[must_use]
pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.matches(name))
}

/// The player or console issuing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSender {
    pub name: String,
    pub elevated: bool,
}

impl CommandSender {
    pub fn new(name: impl Into<String>, elevated: bool) -> Self {
        Self {
            name: name.into(),
            elevated,
        }
    }

    /// The server console, which holds every permission
    #[must_use]
    pub fn console() -> Self {
        Self::new("CONSOLE", true)
    }
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: Vec<String>,
    pub sender: CommandSender,
}

impl CommandInvocation {
    /// Split a command line into name and arguments. A leading `/` is
    /// ignored. Returns `None` for a blank line.
    #[must_use]
    pub fn parse(line: &str, sender: CommandSender) -> Option<Self> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut words = line.split_whitespace();
        let name = words.next()?.to_lowercase();
        Some(Self {
            name,
            args: words.map(str::to_string).collect(),
            sender,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Info,
    Error,
}

/// Text sent back to the command sender
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{text}")]
pub struct CommandReply {
    pub kind: ReplyKind,
    pub text: String,
}

impl CommandReply {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Error,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == ReplyKind::Error
    }
}

/// Run a command and produce the reply for its sender
pub async fn dispatch(data: &Data, invocation: &CommandInvocation) -> CommandReply {
    let started = logging::log_command_start(invocation);
    let reply = execute(data, invocation).await;
    logging::log_command_end(invocation, started, &reply);
    reply
}

async fn execute(data: &Data, invocation: &CommandInvocation) -> CommandReply {
    let Some(spec) = find_command(&invocation.name) else {
        return CommandReply::error(format!("Unknown command: {}", invocation.name));
    };

    if spec.permission == Permission::Elevated && !invocation.sender.elevated {
        return CommandReply::error("You do not have permission to use this command");
    }

    if invocation.args.len() != spec.arity() {
        return CommandReply::error(format!("Usage: {}", spec.usage()));
    }

    match spec.kind {
        CommandKind::Toggle => toggle_ban(data, invocation, spec.purpose).await,
        CommandKind::List => list_bans(data, invocation, spec.purpose).await,
    }
}

async fn toggle_ban(data: &Data, invocation: &CommandInvocation, purpose: Purpose) -> CommandReply {
    let raw_name = &invocation.args[0];
    let verb = purpose.report_verb();
    match data.toggles.toggle(purpose, raw_name).await {
        Ok(ToggleOutcome::Invalid) => {
            CommandReply::error(format!("{raw_name} could not be banned from being {verb}"))
        }
        Ok(ToggleOutcome::Banned(id)) => {
            CommandReply::info(format!("{id} was successfully banned from being {verb}"))
        }
        Ok(ToggleOutcome::Unbanned(id)) => {
            CommandReply::info(format!("{id} was successfully un-banned from being {verb}"))
        }
        Err(e) => {
            logging::log_command_error(invocation, &e);
            CommandReply::error("Internal error while processing the command")
        }
    }
}

async fn list_bans(data: &Data, invocation: &CommandInvocation, purpose: Purpose) -> CommandReply {
    let verb = purpose.report_verb();
    match data.queries.describe(purpose).await {
        Some(names) if names.is_empty() => {
            CommandReply::info(format!("No materials are banned from being {verb}"))
        }
        Some(names) => CommandReply::info(format!(
            "The following materials cannot be {verb}: {}",
            names.join(", ")
        )),
        None => {
            logging::log_command_error(invocation, &BanError::RegistryNotConfigured(purpose));
            CommandReply::error(format!(
                "Could not retrieve the banned materials for {purpose}"
            ))
        }
    }
}
