// Error types at the external-tool seams. Everything here is converted to data
// (sentinels or structured outcomes) before it reaches a request handler.

use thiserror::Error;

/// Failure to obtain any output from an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },
}

#[derive(Debug, Error)]
pub enum WifiError {
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The tool ran and refused; carries its diagnostic text verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected {tool} output: {detail}")]
    UnexpectedOutput { tool: &'static str, detail: String },
}
