#![no_main]

use libfuzzer_sys::fuzz_target;
use taskroll_core::{parse_task_command, TaskCommand};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    match parse_task_command(&raw, "--") {
        None => {
            let trimmed = raw.trim();
            assert!(trimmed.is_empty() || !trimmed.starts_with("--"));
        }
        Some(TaskCommand::Edit { task }) | Some(TaskCommand::Delete { task }) => {
            assert!(!task.is_empty());
            assert_eq!(task, task.trim());
            assert!(!task.contains("  "), "task names are single-spaced");
            assert!(task.split_whitespace().all(|word| !word.starts_with("--")));
        }
        Some(TaskCommand::Invalid { message }) => {
            assert!(!message.is_empty());
        }
        Some(TaskCommand::List) | Some(TaskCommand::Roll) | Some(TaskCommand::Help) => {}
    }
});
