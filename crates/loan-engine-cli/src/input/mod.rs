pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed request from `--input <file>` or, failing that, piped stdin.
/// `Ok(None)` when neither was provided.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    stdin::read_stdin()
}
