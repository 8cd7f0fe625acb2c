//! Exit codes for vtwinctl

use vtwin_common::VtError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when a twin or model document cannot be used
pub const EXIT_INVALID_DOCUMENT: i32 = 65;

/// Pick the exit code for a failed command
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let invalid = err.chain().any(|cause| {
        cause.downcast_ref::<VtError>().is_some() || cause.downcast_ref::<serde_json::Error>().is_some()
    });

    if invalid {
        EXIT_INVALID_DOCUMENT
    } else {
        EXIT_GENERAL_ERROR
    }
}
