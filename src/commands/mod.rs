//! Chat command parsing and dispatch.
//!
//! A message such as `!addassignment alice Essay1 2024-01-01` becomes a
//! [`ParsedCommand`], is checked against the command's minimum argument
//! count and then runs against the [`UserRepository`]. The reply is plain
//! text ready to be sent back to the channel.

use chrono::{DateTime, Utc};

use crate::{
    services::user_service::{AddUserOutcome, AssignmentListing, AssignmentOutcome, UserRepository},
    utils::{
        text::{codeblock_wrap, generate_text_grid},
        AppError,
    },
};

pub const NOT_ENOUGH_ARGUMENTS: &str = "Not enough arguments.";
pub const NO_USERS: &str = "No users in the database.";
pub const NOT_IMPLEMENTED: &str = "Not yet implemented.";
pub const NOT_AUTHORIZED: &str = "You aren't authorized to do that.";

const OVERVIEW_GAP: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lower-cased command name
    pub name: String,
    pub args: Vec<String>,
}

/// Splits `content` into a command name and arguments. `None` when the
/// prefix is missing or nothing follows it.
pub fn parse_command(prefix: &str, content: &str) -> Option<ParsedCommand> {
    let rest = content.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();

    Some(ParsedCommand {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetUsers,
    GetOverview,
    AddUser,
    DeleteUser,
    GetAssignments,
    AddAssignment,
    DeleteAssignment,
    Help,
    InviteLink,
    Ping,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::GetUsers,
        Command::GetOverview,
        Command::AddUser,
        Command::DeleteUser,
        Command::GetAssignments,
        Command::AddAssignment,
        Command::DeleteAssignment,
        Command::Help,
        Command::InviteLink,
        Command::Ping,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getusers" => Some(Command::GetUsers),
            "getoverview" => Some(Command::GetOverview),
            "adduser" => Some(Command::AddUser),
            "deleteuser" => Some(Command::DeleteUser),
            "getassignments" => Some(Command::GetAssignments),
            "addassignment" => Some(Command::AddAssignment),
            "deleteassignment" => Some(Command::DeleteAssignment),
            "help" | "readme" => Some(Command::Help),
            "invitelink" => Some(Command::InviteLink),
            "ping" => Some(Command::Ping),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::GetUsers => "getusers",
            Command::GetOverview => "getoverview",
            Command::AddUser => "adduser",
            Command::DeleteUser => "deleteuser",
            Command::GetAssignments => "getassignments",
            Command::AddAssignment => "addassignment",
            Command::DeleteAssignment => "deleteassignment",
            Command::Help => "help",
            Command::InviteLink => "invitelink",
            Command::Ping => "ping",
        }
    }

    pub fn min_args(&self) -> usize {
        match self {
            Command::AddUser | Command::DeleteUser | Command::GetAssignments | Command::DeleteAssignment => 1,
            Command::AddAssignment => 3,
            _ => 0,
        }
    }

    fn usage(&self) -> (&'static str, &'static str) {
        match self {
            Command::GetUsers => ("", "list every user"),
            Command::GetOverview => ("", "users with their assignment count"),
            Command::AddUser => ("<name>", "add a user"),
            Command::DeleteUser => ("<name>", "delete a user and all of its assignments"),
            Command::GetAssignments => ("<name>", "assignments of a user, by due date"),
            Command::AddAssignment => ("<name> <assignment> <due_date>", "add an assignment to a user"),
            Command::DeleteAssignment => ("<name>", "not yet implemented"),
            Command::Help => ("", "show this message"),
            Command::InviteLink => ("", "invite link for the bot (owner only)"),
            Command::Ping => ("", "reply latency"),
        }
    }
}

/// Who sent the command and when
#[derive(Debug, Clone, Copy, Default)]
pub struct Invoker {
    pub is_owner: bool,
    /// Send time reported by the chat platform, if known
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct CommandDispatcher {
    repository: UserRepository,
    prefix: String,
    invite_link: Option<String>,
}

impl CommandDispatcher {
    pub fn new(repository: UserRepository, prefix: &str, invite_link: Option<String>) -> Self {
        Self {
            repository,
            prefix: prefix.to_string(),
            invite_link,
        }
    }

    /// Parses and runs a raw message. `None` means the message is not for us.
    #[cfg_attr(not(feature = "discord"), allow(dead_code))]
    pub async fn handle_message(&self, content: &str, invoker: Invoker) -> Option<String> {
        let parsed = parse_command(&self.prefix, content)?;
        self.dispatch(&parsed, invoker).await
    }

    /// Runs a parsed command; unknown command names are ignored.
    pub async fn dispatch(&self, parsed: &ParsedCommand, invoker: Invoker) -> Option<String> {
        let command = Command::from_name(&parsed.name)?;

        if parsed.args.len() < command.min_args() {
            log::debug!("{} called with {} argument(s)", command.name(), parsed.args.len());
            return Some(NOT_ENOUGH_ARGUMENTS.to_string());
        }

        log::info!("💬 {} {:?}", command.name(), parsed.args);

        let reply = match self.execute(command, &parsed.args, invoker).await {
            Ok(reply) => reply,
            Err(AppError::InvalidRequest(msg)) => msg,
            Err(AppError::NotImplemented(_)) => NOT_IMPLEMENTED.to_string(),
            Err(AppError::Unauthorized(_)) => NOT_AUTHORIZED.to_string(),
            Err(e) => {
                log::error!("❌ {} failed: {}", command.name(), e);
                format!("Could not complete {}: {}", command.name(), e)
            }
        };
        Some(reply)
    }

    async fn execute(&self, command: Command, args: &[String], invoker: Invoker) -> Result<String, AppError> {
        match command {
            Command::GetUsers => {
                let names = self.repository.list_user_names().await?;
                if names.is_empty() {
                    Ok(codeblock_wrap(NO_USERS, ""))
                } else {
                    Ok(codeblock_wrap(&names.join("\n"), ""))
                }
            }
            Command::GetOverview => {
                let overview = self.repository.list_overview().await?;
                if overview.is_empty() {
                    return Ok(NO_USERS.to_string());
                }

                let mut grid = vec![
                    vec!["NAME".to_string(), "ASSIGNMENTS".to_string()],
                    vec!["----".to_string(), "-----------".to_string()],
                ];
                grid.extend(
                    overview
                        .into_iter()
                        .map(|o| vec![o.name, format!("[{}]", o.assignment_count)]),
                );
                let rows = generate_text_grid(&grid, OVERVIEW_GAP, "");
                Ok(codeblock_wrap(&rows.join("\n"), "SQL"))
            }
            Command::AddUser => {
                let name = &args[0];
                Ok(match self.repository.add_user(name).await? {
                    AddUserOutcome::Created => format!("Added {} to the database.", name),
                    AddUserOutcome::AlreadyExists => format!("{} is already in the database.", name),
                })
            }
            Command::DeleteUser => {
                let deleted = self.repository.delete_user(&args[0]).await?;
                Ok(deletion_message(deleted))
            }
            Command::GetAssignments => {
                let name = &args[0];
                Ok(match self.repository.list_assignments(name).await? {
                    AssignmentListing::UnknownUser(message) => codeblock_wrap(&message, ""),
                    AssignmentListing::Assignments(lines) if lines.is_empty() => {
                        codeblock_wrap(&format!("{} has no assignments.", name), "")
                    }
                    AssignmentListing::Assignments(lines) => codeblock_wrap(&lines.join("\n"), ""),
                })
            }
            Command::AddAssignment => {
                let (name, assignment, due_date) = (&args[0], &args[1], &args[2]);
                Ok(match self.repository.add_assignment(name, assignment, Some(due_date.as_str())).await? {
                    AssignmentOutcome::Added => format!("Added {} for {}, due by {}.", assignment, name, due_date),
                    AssignmentOutcome::UnknownUser => {
                        format!("{} isn't in the database, assignment not added.", name)
                    }
                })
            }
            Command::DeleteAssignment => Err(AppError::NotImplemented(command.name().to_string())),
            Command::Help => Ok(self.help()),
            Command::InviteLink => {
                if !invoker.is_owner {
                    return Err(AppError::Unauthorized("invitelink is owner only".to_string()));
                }
                Ok(self
                    .invite_link
                    .clone()
                    .unwrap_or_else(|| "No client id configured, cannot build an invite link.".to_string()))
            }
            Command::Ping => Ok(pong(invoker.sent_at, Utc::now())),
        }
    }

    fn help(&self) -> String {
        let grid: Vec<Vec<String>> = Command::ALL
            .iter()
            .map(|command| {
                let (args, description) = command.usage();
                let usage = format!("{}{} {}", self.prefix, command.name(), args);
                vec![usage.trim_end().to_string(), description.to_string()]
            })
            .collect();
        codeblock_wrap(&generate_text_grid(&grid, 2, "").join("\n"), "")
    }
}

fn pong(sent_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match sent_at {
        // clocks may disagree by a few ms
        Some(sent_at) => format!("Pong! Latency is {}ms.", (now - sent_at).num_milliseconds().max(0)),
        None => "Pong!".to_string(),
    }
}

/// Shared by the chat command and DELETE /v1/users/{name}
pub fn deletion_message(deleted: u64) -> String {
    if deleted == 0 {
        "That user isn't in the database.".to_string()
    } else {
        format!("Deleted {} user(s) from the database.", deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn dispatcher() -> CommandDispatcher {
        let repository = UserRepository::new(Arc::new(MemoryStore::new()));
        CommandDispatcher::new(repository, "!", Some("Invite link: https://example".to_string()))
    }

    async fn run(dispatcher: &CommandDispatcher, content: &str) -> Option<String> {
        dispatcher.handle_message(content, Invoker::default()).await
    }

    #[test]
    fn test_parse_collapses_whitespace_and_lowercases() {
        let parsed = parse_command("!", "!AddAssignment   alice  Essay1 2024-01-01").unwrap();
        assert_eq!(parsed.name, "addassignment");
        assert_eq!(parsed.args, vec!["alice", "Essay1", "2024-01-01"]);
    }

    #[test]
    fn test_parse_requires_prefix() {
        assert!(parse_command("!", "getusers").is_none());
        assert!(parse_command("!", "!").is_none());
        assert!(parse_command("!", "!   ").is_none());
        assert_eq!(parse_command("bb ", "bb getusers").unwrap().name, "getusers");
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let d = dispatcher();
        assert!(run(&d, "!dance").await.is_none());
        assert!(run(&d, "hello there").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_arguments_do_not_reach_repository() {
        let d = dispatcher();
        assert_eq!(run(&d, "!adduser").await.unwrap(), NOT_ENOUGH_ARGUMENTS);
        assert_eq!(run(&d, "!addassignment alice Essay1").await.unwrap(), NOT_ENOUGH_ARGUMENTS);
        assert_eq!(run(&d, "!getusers").await.unwrap(), codeblock_wrap(NO_USERS, ""));
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let d = dispatcher();
        assert_eq!(run(&d, "!adduser alice").await.unwrap(), "Added alice to the database.");
        assert_eq!(run(&d, "!adduser alice").await.unwrap(), "alice is already in the database.");
        assert_eq!(run(&d, "!adduser bob").await.unwrap(), "Added bob to the database.");
        assert_eq!(run(&d, "!getusers").await.unwrap(), "```\nalice\nbob\n```");

        assert_eq!(run(&d, "!deleteuser alice").await.unwrap(), "Deleted 1 user(s) from the database.");
        assert_eq!(run(&d, "!deleteuser alice").await.unwrap(), "That user isn't in the database.");
    }

    #[tokio::test]
    async fn test_assignments() {
        let d = dispatcher();
        run(&d, "!adduser alice").await;

        assert_eq!(
            run(&d, "!getassignments alice").await.unwrap(),
            "```\nalice has no assignments.\n```"
        );
        assert_eq!(
            run(&d, "!addassignment alice Essay1 2024-02-01").await.unwrap(),
            "Added Essay1 for alice, due by 2024-02-01."
        );
        run(&d, "!addassignment alice Quiz 2024-01-01").await;
        assert_eq!(
            run(&d, "!getassignments alice").await.unwrap(),
            "```\nAssignment: Quiz is due by 2024-01-01\nAssignment: Essay1 is due by 2024-02-01\n```"
        );

        assert_eq!(
            run(&d, "!addassignment carol Essay1 2024-02-01").await.unwrap(),
            "carol isn't in the database, assignment not added."
        );
        assert_eq!(
            run(&d, "!getassignments carol").await.unwrap(),
            "```\ncarol isn't in the database.\n```"
        );
    }

    #[tokio::test]
    async fn test_overview_grid() {
        let d = dispatcher();
        assert_eq!(run(&d, "!getoverview").await.unwrap(), NO_USERS);

        run(&d, "!adduser alice").await;
        run(&d, "!adduser bo").await;
        run(&d, "!addassignment alice Essay1 2024-02-01").await;

        let reply = run(&d, "!getoverview").await.unwrap();
        let expected = [
            format!("NAME{}ASSIGNMENTS", " ".repeat(5)),
            format!("----{}-----------", " ".repeat(5)),
            format!("alice{}[1]", " ".repeat(4)),
            format!("bo{}[0]", " ".repeat(7)),
        ]
        .join("\n");
        assert_eq!(reply, codeblock_wrap(&expected, "SQL"));
    }

    #[tokio::test]
    async fn test_delete_assignment_not_implemented() {
        let d = dispatcher();
        assert_eq!(run(&d, "!deleteassignment").await.unwrap(), NOT_ENOUGH_ARGUMENTS);
        assert_eq!(run(&d, "!deleteassignment alice").await.unwrap(), NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_invite_link_owner_only() {
        let d = dispatcher();
        assert_eq!(run(&d, "!invitelink").await.unwrap(), NOT_AUTHORIZED);

        let reply = d
            .handle_message("!invitelink", Invoker { is_owner: true, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(reply, "Invite link: https://example");
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let d = dispatcher();
        let help = run(&d, "!readme").await.unwrap();
        for command in Command::ALL {
            assert!(help.contains(&format!("!{}", command.name())));
        }
    }

    #[tokio::test]
    async fn test_ping_reports_latency_when_send_time_known() {
        let d = dispatcher();
        assert_eq!(run(&d, "!ping").await.unwrap(), "Pong!");

        let invoker = Invoker {
            sent_at: Some(Utc::now()),
            ..Default::default()
        };
        let reply = d.handle_message("!ping", invoker).await.unwrap();
        assert!(reply.starts_with("Pong! Latency is "));
        assert!(reply.ends_with("ms."));
    }

    #[test]
    fn test_pong_latency() {
        let now = Utc::now();
        let sent = now - chrono::Duration::milliseconds(42);
        assert_eq!(pong(Some(sent), now), "Pong! Latency is 42ms.");
        // send time ahead of the local clock
        assert_eq!(pong(Some(now), sent), "Pong! Latency is 0ms.");
    }
}
