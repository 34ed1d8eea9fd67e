use std::{
    io::{self, Write},
    process::ExitCode,
};

use bytes::Bytes;
use tracing::debug;

use crate::{
    error::{LeaseError, Outcome},
    lease::{renewer::RenewalExit, LeaseGrant, LeaseHandle},
};

/// How a successful lock is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LockOutput {
    /// The raw response body.
    #[default]
    Json,
    /// Only the decoded token.
    Token,
}

/// Progress hook for long-running sessions.
pub trait Reporter: Send + Sync {
    fn renewed(&self, handle: &LeaseHandle, grant: &LeaseGrant);
}

/// Prints every renewal body on its own line, the way one-shot refreshes do.
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn renewed(&self, _handle: &LeaseHandle, grant: &LeaseGrant) {
        print_body(grant.body());
    }
}

/// Renders a successful lock. In token mode a body that does not carry a
/// token is a failure, never an empty line.
pub fn render_lock(grant: &LeaseGrant, output: LockOutput) -> Outcome<String> {
    match output {
        LockOutput::Json => Ok(body_text(grant.body())),
        LockOutput::Token => Ok(grant.token()?.as_str().to_string()),
    }
}

pub fn body_text(body: &Bytes) -> String {
    String::from_utf8_lossy(body).trim_end().to_string()
}

/// Prints the outcome of a one-shot command and maps it to the process exit.
pub fn finish(outcome: Outcome<String>) -> ExitCode {
    match outcome {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err),
    }
}

pub fn finish_renewal(exit: RenewalExit) -> ExitCode {
    match exit {
        RenewalExit::Released(body) => {
            print_body(&body);
            ExitCode::SUCCESS
        }
        RenewalExit::ReleaseFailed(err) => fail(&err),
        RenewalExit::RenewalFailed(err) => {
            eprintln!("Could not refresh anymore: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn fail(err: &LeaseError) -> ExitCode {
    eprintln!("{}", err);
    ExitCode::FAILURE
}

fn print_body(body: &Bytes) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{}", body_text(body)).and_then(|_| stdout.flush()) {
        debug!(%err, "could not write response body");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(body: &'static [u8]) -> LeaseGrant {
        LeaseGrant::new(Bytes::from_static(body))
    }

    #[test]
    fn json_mode_passes_body_through() {
        let rendered = render_lock(&grant(b"{\"token\":\"abc\"}\n"), LockOutput::Json).unwrap();
        assert_eq!(rendered, "{\"token\":\"abc\"}");
    }

    #[test]
    fn json_mode_does_not_decode() {
        let rendered = render_lock(&grant(b"ok"), LockOutput::Json).unwrap();
        assert_eq!(rendered, "ok");
    }

    #[test]
    fn token_mode_prints_bare_token() {
        let rendered = render_lock(
            &grant(br#"{"token":"abc","expiresAt":"2030-01-01T00:00:00Z"}"#),
            LockOutput::Token,
        )
        .unwrap();
        assert_eq!(rendered, "abc");
    }

    #[test]
    fn token_mode_fails_on_empty_token() {
        let err = render_lock(&grant(br#"{"token":""}"#), LockOutput::Token).unwrap_err();
        assert!(matches!(err, LeaseError::EmptyToken));
    }

    #[test]
    fn token_mode_fails_on_undecodable_body() {
        let err = render_lock(&grant(b"<html>"), LockOutput::Token).unwrap_err();
        assert!(matches!(err, LeaseError::Decode(_)));
    }

    #[test]
    fn only_release_ends_renewal_successfully() {
        assert_eq!(
            finish_renewal(RenewalExit::Released(Bytes::from_static(b"bye"))),
            ExitCode::SUCCESS
        );
        let expired = || LeaseError::Expired {
            name: crate::lease::LeaseName::new("db"),
        };
        assert_eq!(finish_renewal(RenewalExit::ReleaseFailed(expired())), ExitCode::FAILURE);
        assert_eq!(finish_renewal(RenewalExit::RenewalFailed(expired())), ExitCode::FAILURE);
    }
}
