//! Priority-to-weight transform driving table order and weighted rolls.

/// Highest priority a task can hold; adjustments clamp to this ceiling.
pub const MAX_PRIORITY: i64 = 100;

/// Maps a stored priority to its display and selection weight.
///
/// Zero and negative priorities carry no weight. Positive priorities grow
/// along the Fibonacci sequence (1, 2, 3, 5, 8, ...), so each step up
/// multiplies a task's roll odds by roughly the golden ratio. Priority 100
/// maps past u64 range, hence the u128 return.
pub fn priority_weight(priority: i64) -> u128 {
    debug_assert!(
        priority <= MAX_PRIORITY,
        "priority {priority} above ceiling"
    );
    if priority <= 0 {
        return 0;
    }
    let (mut current, mut next) = (0u128, 1u128);
    for _ in 0..=priority {
        let sum = current + next;
        current = next;
        next = sum;
    }
    current
}
