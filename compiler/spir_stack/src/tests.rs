use pretty_assertions::assert_eq;

use super::*;

/// Counts down through one frame per level.
fn nest(levels: u32) -> u32 {
    ensure_sufficient_stack(|| if levels == 0 { 0 } else { nest(levels - 1) + 1 })
}

#[test]
fn shallow_calls_pass_through() {
    assert_eq!(ensure_sufficient_stack(|| "done"), "done");
    assert_eq!(nest(16), 16);
}

#[test]
fn deep_recursion_grows_the_stack() {
    assert_eq!(nest(200_000), 200_000);
}

#[test]
fn results_propagate() {
    let parsed: Result<u8, String> = ensure_sufficient_stack(|| "7".parse().map_err(|_| String::new()));
    assert_eq!(parsed, Ok(7));
}
