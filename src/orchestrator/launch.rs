//! Hand-off to the wrapped command.

use crate::environment::Environment;
use crate::error::InjectorError;
use std::convert::Infallible;
use std::ffi::OsString;
use std::process::Command;
use tracing::debug;

/// Build the wrapped command. Only variables written since the environment
/// snapshot are set explicitly; everything else is inherited.
pub fn build_command(command: &[OsString], env: &Environment) -> Result<Command, InjectorError> {
    let (program, args) = command.split_first().ok_or(InjectorError::MissingCommand)?;
    let mut cmd = Command::new(program);
    cmd.args(args).envs(env.overrides());
    Ok(cmd)
}

/// Replace the current process with the wrapped command.
///
/// Only returns on failure.
#[cfg(unix)]
pub fn exec(command: &[OsString], env: &Environment) -> Result<Infallible, InjectorError> {
    use std::os::unix::process::CommandExt;

    let mut cmd = build_command(command, env)?;
    debug!("exec {:?}", cmd.get_program());
    let source = cmd.exec();
    Err(InjectorError::Exec {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })
}

/// Run the wrapped command to completion and exit with its status.
#[cfg(not(unix))]
pub fn exec(command: &[OsString], env: &Environment) -> Result<Infallible, InjectorError> {
    let mut cmd = build_command(command, env)?;
    debug!("spawn {:?}", cmd.get_program());
    let status = cmd.status().map_err(|source| InjectorError::Exec {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })?;
    std::process::exit(status.code().unwrap_or(1))
}
