//! Command-line flags. Applied on top of the loaded config.

use std::path::PathBuf;

use clap::Parser;
use pocbench_core::{load_config, Config, StoreBackend};

#[derive(Debug, Clone, Parser)]
#[command(name = "pocbench", version, about = "Benchmark HTTP service with a row-locked interaction log")]
pub struct Cli {
    /// Config file to use instead of ./pocbench.toml
    #[arg(short, long, env = "POCBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub bind: Option<String>,

    /// Entity store engine: postgres or memory
    #[arg(long)]
    pub backend: Option<StoreBackend>,
}

impl Cli {
    /// Load every config layer, apply flags on top, then validate once.
    pub fn resolve(&self) -> pocbench_core::Result<Config> {
        let config = self.apply(load_config(self.config.as_deref())?);
        config.validate()?;
        Ok(config)
    }

    /// Layer flags over `config`; flags win.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        config
    }
}
