//! Caller-location annotations
//!
//! Walks the call stack from [`caller_annotation`] itself (depth 0) and
//! formats the frame found `depth` levels further out as
//! `[function file line]`. The logger's entry points sit at a fixed depth
//! below the user's call site, so [`DEFAULT_MAX_DEPTH`] lands on the caller.
//! Moving a logging call behind extra wrapper functions shifts the result;
//! adjust the depth with `Logger::set_max_depth` in that case.

use std::path::Path;

/// Frames between [`caller_annotation`] and the code that called the logger
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Written when the frame cannot be resolved
pub const UNKNOWN_CALLER: &str = "[unknown - 0]";

const ANCHOR_SYMBOL: &str = "caller_annotation";

/// Resolved location of one stack frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerFrame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl CallerFrame {
    /// `[function file line]`, using the last path segment of both
    pub fn annotation(&self) -> String {
        let function = self
            .function
            .rsplit("::")
            .next()
            .unwrap_or(self.function.as_str());
        let file = Path::new(&self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file.as_str());
        format!("[{} {} {}]", function, file, self.line)
    }
}

/// Annotation for the frame `depth` levels above this function.
///
/// Never fails: an unresolvable frame (stack too shallow, stripped
/// symbols) yields [`UNKNOWN_CALLER`].
#[inline(never)]
pub fn caller_annotation(depth: usize) -> String {
    match resolve_caller(depth) {
        Some(frame) => frame.annotation(),
        None => UNKNOWN_CALLER.to_string(),
    }
}

#[inline(never)]
fn resolve_caller(depth: usize) -> Option<CallerFrame> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        frames.push(frame.clone());
        true
    });

    let mut anchor = None;
    for (idx, frame) in frames.iter().enumerate() {
        let mut is_anchor = false;
        backtrace::resolve_frame(frame, |symbol| {
            if let Some(name) = symbol.name() {
                if format!("{:#}", name).ends_with(ANCHOR_SYMBOL) {
                    is_anchor = true;
                }
            }
        });
        if is_anchor {
            anchor = Some(idx);
            break;
        }
    }

    let target = frames.get(anchor?.checked_add(depth)?)?;

    let mut resolved = None;
    backtrace::resolve_frame(target, |symbol| {
        if resolved.is_some() {
            return;
        }
        let (Some(name), Some(file), Some(line)) =
            (symbol.name(), symbol.filename(), symbol.lineno())
        else {
            return;
        };
        resolved = Some(CallerFrame {
            function: format!("{:#}", name),
            file: file.display().to_string(),
            line,
        });
    });
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_uses_short_names() {
        let frame = CallerFrame {
            function: "my_app::server::handle_request".to_string(),
            file: "/home/dev/my_app/src/server.rs".to_string(),
            line: 87,
        };
        assert_eq!(frame.annotation(), "[handle_request server.rs 87]");
    }

    #[test]
    fn test_unreachable_depth_falls_back_to_placeholder() {
        assert_eq!(caller_annotation(10_000), UNKNOWN_CALLER);
    }

    #[test]
    fn test_huge_depth_does_not_overflow() {
        assert_eq!(caller_annotation(usize::MAX), UNKNOWN_CALLER);
    }

    #[test]
    fn test_annotation_is_bracketed() {
        let annotation = caller_annotation(1);
        assert!(annotation.starts_with('['));
        assert!(annotation.ends_with(']'));
        assert!(annotation == UNKNOWN_CALLER || annotation.split(' ').count() >= 3);
    }
}
