use std::process::ExitCode;

use crate::args::GlobalArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Error,
}

/// Outcome of a command, with an optional closing line for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    status: Status,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: Status::Error,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the closing message and turn the outcome into a process exit code.
    ///
    /// Success messages are suppressed by `--quiet`; error messages never are.
    pub fn report(self, global: &GlobalArgs) -> ExitCode {
        match (self.status, self.message) {
            (Status::Success, Some(message)) if !global.quiet => println!("{message}"),
            (Status::Error, Some(message)) => eprintln!("{message}"),
            _ => {}
        }

        match self.status {
            Status::Success => ExitCode::SUCCESS,
            Status::Error => ExitCode::FAILURE,
        }
    }
}
