//! Version command implementation.

use serde::Serialize;

use crate::transport::http::DEFAULT_API_BASE;
use crate::error::Result;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
    build: &'static str,
    default_api_base: &'static str,
}

impl VersionOutput {
    const fn current() -> Self {
        Self {
            name: "docsync",
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) { "dev" } else { "release" },
            default_api_base: DEFAULT_API_BASE,
        }
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput::current();
    if json {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} version {} ({})", output.name, output.version, output.build);
    }
    Ok(())
}
