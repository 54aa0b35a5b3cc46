//! Safety checks to prevent overwriting the library snapshot with a report.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that a report path is safe to write.
///
/// Checks:
/// - The report must have a `.json` extension
/// - The report cannot be the library snapshot itself
pub fn validate_report_path(output: &Path, library: &Path) -> Result<()> {
    let is_json = output
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: report '{}' must have a .json extension",
            output.display()
        );
    }

    let same_file = match (output.canonicalize(), library.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => output == library,
    };
    if same_file {
        bail!(
            "Safety check failed: report '{}' cannot be the same as library '{}'",
            output.display(),
            library.display()
        );
    }

    Ok(())
}
