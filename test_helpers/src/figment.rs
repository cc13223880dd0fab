//! Shared helpers for working with `figment::Jail` in tests.
//!
//! A jail gives each test its own working directory and restores the process
//! environment afterwards, which keeps file and environment layering tests
//! independent of each other.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// The jail is torn down once the closure completes, even when it returns an
/// error. Failures are converted into `anyhow::Error` values so callers can
/// use the `?` operator.
///
/// # Errors
///
/// Returns an error if the jail initialisation fails or the closure returns a
/// [`figment::error::Error`].
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any error implementing [`ToString`] into a [`figment::Error`].
///
/// Lets closures passed to [`with_jail`] use `?` on loader results.
#[expect(
    clippy::needless_pass_by_value,
    reason = "callers own the error and use this with `map_err`"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
