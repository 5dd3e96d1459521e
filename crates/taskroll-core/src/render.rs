//! Monospace rendering for chat replies.
//!
//! Everything the bot says is wrapped in a code fence so column
//! alignment survives proportional chat fonts.

/// Wraps free text in a code fence without any table layout.
pub fn render_plain(text: &str) -> String {
    format!("```{text}```")
}

/// Renders a one-row table for a single task and its transformed weight.
pub fn render_single(task: &str, weight: u128) -> String {
    render_table(&[(task.to_string(), weight)])
}

/// Renders tasks and transformed weights as a fenced two-column table.
///
/// Rows are ordered heaviest first; equal weights keep their input
/// order, so name-ordered input yields alphabetical ties. Task names are
/// left-justified, weights right-justified, with a two-space gutter.
/// Callers handle the empty list before rendering.
pub fn render_table(entries: &[(String, u128)]) -> String {
    debug_assert!(!entries.is_empty(), "empty task tables are not rendered");

    let mut rows: Vec<(&str, u128)> = entries
        .iter()
        .map(|(task, weight)| (task.as_str(), *weight))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    let rows: Vec<(&str, String)> = rows
        .into_iter()
        .map(|(task, weight)| (task, weight.to_string()))
        .collect();

    let task_width = rows
        .iter()
        .map(|(task, _)| task.chars().count())
        .chain(std::iter::once("TASK".len()))
        .max()
        .unwrap_or(0);
    let weight_width = rows
        .iter()
        .map(|(_, weight)| weight.len())
        .chain(std::iter::once("PRIORITY".len()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{:<task_width$}  {:>weight_width$}",
        "TASK", "PRIORITY"
    ));
    for (task, weight) in rows {
        lines.push(format!("{task:<task_width$}  {weight:>weight_width$}"));
    }
    format!("```{}```", lines.join("\n"))
}
