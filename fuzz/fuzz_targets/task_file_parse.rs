#![no_main]

use libfuzzer_sys::fuzz_target;
use taskroll_core::{priority_weight, render_table, TaskStore};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let Ok(mut tasks) = serde_json::from_str::<TaskStore>(&raw) else {
        return;
    };

    tasks.clamp_to_ceiling();
    tasks.clean();

    let entries: Vec<(String, u128)> = tasks
        .iter()
        .map(|(task, priority)| {
            assert!(priority > 0, "clean leaves only positive priorities");
            (task.to_string(), priority_weight(priority))
        })
        .collect();
    if !entries.is_empty() {
        let rendered = render_table(&entries);
        assert!(rendered.starts_with("```"));
        assert!(rendered.ends_with("```"));
    }
});
