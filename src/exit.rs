use crate::name::NameError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Failed,
    InvalidArgs,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failed => 1,
            ExitCode::InvalidArgs => 2,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

/// Name errors anywhere in the chain are bad input; everything else is a failure.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    if err.chain().any(|cause| cause.is::<NameError>()) {
        return ExitCode::InvalidArgs.as_i32();
    }
    ExitCode::Failed.as_i32()
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}
