//! JSON envelope printed on stdout for every API command.

use anyhow::Result;
use jules_core::retry::ErrorPayload;
use jules_core::ApiError;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Ok { ok: bool, data: Value },
    Fail { ok: bool, error: ErrorPayload },
}

impl Envelope {
    pub fn from_result(result: &Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Envelope::Ok {
                ok: true,
                data: data.clone(),
            },
            Err(err) => Envelope::Fail {
                ok: false,
                error: err.payload(),
            },
        }
    }
}

/// Print the envelope for `result`; failures map to exit status 1.
pub fn emit(result: Result<Value, ApiError>) -> Result<ExitCode> {
    if let Err(err) = &result {
        tracing::warn!(
            code = err.kind().as_str(),
            status = ?err.status(),
            "command failed: {}",
            err.message()
        );
    }
    let text = serde_json::to_string_pretty(&Envelope::from_result(&result))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
