#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::any::Any;

/// Splits a trace into report lines: each line trimmed, blank lines and caret
/// underlines (`^^^^`) dropped.
pub fn clean_stacktrace(trace: &str) -> Vec<String> {
    trace
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.chars().all(|c| c == '^'))
        .map(String::from)
        .collect()
}

/// Extracts the message carried by a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}

/// The last path segment of a type's name, eg. `ProjectOneTest` for
/// `autobadger::projects::p1::ProjectOneTest`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
