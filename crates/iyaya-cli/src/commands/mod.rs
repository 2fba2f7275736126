pub mod applications;
pub mod auth;
pub mod bookings;
pub mod caregivers;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod server;

use anyhow::{Result, bail};

/// Parses positional `key=value` filter arguments.
pub(crate) fn parse_params(params: &[String]) -> Result<Vec<(String, String)>> {
    let mut filters = Vec::with_capacity(params.len());
    for param in params {
        match param.split_once('=') {
            Some((key, value)) => filters.push((key.to_string(), value.to_string())),
            None => bail!("Invalid filter '{param}', expected key=value"),
        }
    }
    Ok(filters)
}
