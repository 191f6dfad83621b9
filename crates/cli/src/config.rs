use std::path::PathBuf;

use anyhow::{bail, Result};

/// Settings for one CLI run, loaded from the environment.
///
/// | Env Var                   | Required | Description                                  |
/// |---------------------------|----------|----------------------------------------------|
/// | `VALENCE_INPUT`           | yes*     | Batch document path (first argument wins)    |
/// | `VALENCE_PIPELINE_CONFIG` | no       | Pipeline config JSON applied to every metric |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub input: PathBuf,
    pub pipeline_config: Option<PathBuf>,
}

impl CliConfig {
    /// Resolve settings from an optional positional argument and the
    /// process environment.
    pub fn from_env(arg: Option<String>) -> Result<Self> {
        Self::resolve(arg, |key| std::env::var(key).ok())
    }

    fn resolve(arg: Option<String>, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let input = match arg.or_else(|| var("VALENCE_INPUT")) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => bail!("no input given: pass a path or set VALENCE_INPUT"),
        };
        let pipeline_config = var("VALENCE_PIPELINE_CONFIG")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            input,
            pipeline_config,
        })
    }
}
