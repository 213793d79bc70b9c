/// Exit codes for mdtidy
///
/// Lint issues and tool failures are kept apart so CI can tell a dirty
/// document from a broken invocation.
/// Success - No issues remain, or the document is already formatted
pub const SUCCESS: i32 = 0;

/// Issues remain after the command, or `fmt --check` found unformatted input
pub const VIOLATIONS_FOUND: i32 = 1;

/// Tool error - Settings error, file access error, or a formatter failure
pub const TOOL_ERROR: i32 = 2;

/// Exit code for a document that does or does not still need attention.
pub fn for_outcome(clean: bool) -> i32 {
    if clean { SUCCESS } else { VIOLATIONS_FOUND }
}
