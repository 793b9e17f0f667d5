//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `labelcheck` exit codes.
//! Exit codes are part of the shell contract. Scheduled jobs rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain     | Description                                   |
//! |------|------------|-----------------------------------------------|
//! | 0    | Universal  | Success, report written                       |
//! | 1    | Universal  | General error (unspecified)                   |
//! | 2    | Universal  | CLI usage error (bad args, unreadable config) |
//! | 3    | config     | Config failed to parse or validate            |
//! | 4    | config     | Credentials could not be resolved             |
//! | 5    | index      | Transport failure or non-success HTTP status  |
//! | 6    | index      | Malformed response or varfield hit            |
//! | 7    | report     | No rows survived the report filter            |
//! | 8    | report     | Report or summary could not be written        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code`

use labelcheck_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing or unreadable config file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3-4)
// =============================================================================

/// Config TOML is malformed or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// An index username or password could not be resolved
/// (unset env var, aws CLI missing or failing).
pub const EXIT_CREDENTIALS: u8 = 4;

// =============================================================================
// Index (5-6)
// =============================================================================

/// Request never completed, or the index answered with a non-2xx status.
/// Never retried.
pub const EXIT_INDEX_UNAVAILABLE: u8 = 5;

/// Response body was not the expected shape, or a varfield hit lacked
/// a required field.
pub const EXIT_INDEX_MALFORMED: u8 = 6;

// =============================================================================
// Report (7-8)
// =============================================================================

/// No varfield hit carried enough identifier subfields to be reported.
pub const EXIT_EMPTY_REPORT: u8 = 7;

/// Report or summary file could not be written.
pub const EXIT_IO: u8 = 8;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Credentials(_) => EXIT_CREDENTIALS,
        ReconError::Transport { .. } | ReconError::Http { .. } => EXIT_INDEX_UNAVAILABLE,
        ReconError::Response { .. } | ReconError::MalformedHit(_) => EXIT_INDEX_MALFORMED,
        ReconError::EmptyReport { .. } => EXIT_EMPTY_REPORT,
        ReconError::Io(_) => EXIT_IO,
    }
}
