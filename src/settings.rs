use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_OUTPUT: &str = "assets/data/bilan-cpf-reglementation.json";
pub const DEFAULT_ARRETE_URL: &str = "https://www.legifrance.gouv.fr/loda/id/JORFTEXT000050935023";
pub const DEFAULT_CODE_URL: &str =
    "https://www.legifrance.gouv.fr/codes/article_lc/LEGIARTI000038878296";
pub const DEFAULT_USER_AGENT: &str = "TraguardoLegifranceSync/1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Run settings: built-in defaults, then `LEGIFRANCE_*` environment
/// variables. CLI flags are applied on top by the caller.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub output: String,
    pub arrete_url: String,
    pub code_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix("LEGIFRANCE"))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("arrete_url", DEFAULT_ARRETE_URL)?
            .set_default("code_url", DEFAULT_CODE_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .add_source(env)
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid LEGIFRANCE_* settings")
    }
}
