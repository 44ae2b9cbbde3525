// CLI module - argument parsing and entry points for both tools
pub mod export;
pub mod import;

use crate::error::{TemplateToolError, FAILURE_EXIT_CODE};

/// Exit code for a failed run.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TemplateToolError>()
        .map(TemplateToolError::exit_code)
        .unwrap_or(FAILURE_EXIT_CODE)
}
