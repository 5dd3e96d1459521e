//! Prefix command parsing and usage rendering.

/// One parsed chat command.
///
/// `Invalid` carries the full reply text; callers send it verbatim and
/// touch no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Edit { task: String },
    Delete { task: String },
    List,
    Roll,
    Help,
    Invalid { message: String },
}

pub fn command_usage(prefix: &str) -> String {
    [
        "Supported task commands:".to_string(),
        format!("- `{prefix}edit TASK` Add a new task or edit an existing one."),
        format!("- `{prefix}delete TASK` Remove a task from the list."),
        format!("- `{prefix}list` Display the current task list."),
        format!("- `{prefix}roll` Choose a task weighted by priority."),
        format!("- `{prefix}help` Show this message."),
    ]
    .join("\n")
}

/// Parses a chat message into a command.
///
/// Returns `None` when the message does not start with the prefix; such
/// messages are ordinary conversation and get no reply. The prefix must
/// be glued to the verb (`--edit`, not `-- edit`); remaining words form
/// the task name. A second prefixed token is rejected so exactly one
/// command applies per message.
pub fn parse_task_command(text: &str, prefix: &str) -> Option<TaskCommand> {
    let trimmed = text.trim();
    let mut pieces = trimmed.split_whitespace();
    let first = pieces.next()?;
    let verb = first.strip_prefix(prefix)?;
    if verb.is_empty() {
        return Some(TaskCommand::Invalid {
            message: command_usage(prefix),
        });
    }

    let args: Vec<&str> = pieces.collect();
    if let Some(option) = args.iter().find(|token| token.starts_with(prefix)) {
        return Some(TaskCommand::Invalid {
            message: format!(
                "Unexpected option `{option}`.\n\n{}",
                command_usage(prefix)
            ),
        });
    }
    let task = args.join(" ");

    let parsed = match verb {
        "edit" => {
            if task.is_empty() {
                TaskCommand::Invalid {
                    message: format!("Usage: {prefix}edit TASK\n\n{}", command_usage(prefix)),
                }
            } else {
                TaskCommand::Edit { task }
            }
        }
        "delete" => {
            if task.is_empty() {
                TaskCommand::Invalid {
                    message: format!("Usage: {prefix}delete TASK\n\n{}", command_usage(prefix)),
                }
            } else {
                TaskCommand::Delete { task }
            }
        }
        "list" => {
            if task.is_empty() {
                TaskCommand::List
            } else {
                TaskCommand::Invalid {
                    message: format!("Usage: {prefix}list\n\n{}", command_usage(prefix)),
                }
            }
        }
        "roll" => {
            if task.is_empty() {
                TaskCommand::Roll
            } else {
                TaskCommand::Invalid {
                    message: format!("Usage: {prefix}roll\n\n{}", command_usage(prefix)),
                }
            }
        }
        "help" => {
            if task.is_empty() {
                TaskCommand::Help
            } else {
                TaskCommand::Invalid {
                    message: format!("Usage: {prefix}help\n\n{}", command_usage(prefix)),
                }
            }
        }
        _ => TaskCommand::Invalid {
            message: format!("Unknown command `{verb}`.\n\n{}", command_usage(prefix)),
        },
    };
    Some(parsed)
}
