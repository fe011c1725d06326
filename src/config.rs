use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::auth::EndpointIdentity;
use crate::error::{NacosError, Result};

/// Default Nacos server address
pub const DEFAULT_ADDR: &str = "http://127.0.0.1:8848/nacos";

/// Default config API version
pub const DEFAULT_API_VERSION: &str = "v1";

/// Token cache directory name under the user's home
const CACHE_DIR_NAME: &str = ".nacosctl";

/// nacosctl - manage Nacos configuration from the command line
#[derive(Parser, Debug)]
#[command(name = "nacosctl", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Nacos namespace ID (required)
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// Nacos group name [default: DEFAULT_GROUP]
    #[arg(short = 'g', long, global = true)]
    pub group: Option<String>,

    /// Nacos username (overrides NACOS_USERNAME)
    #[arg(short = 'u', long, global = true, env = "NACOS_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// Nacos password (overrides NACOS_PASSWORD)
    #[arg(short = 'p', long, global = true, env = "NACOS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Nacos server address
    #[arg(long, global = true, env = "NACOS_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Config API version
    #[arg(long, global = true, env = "NACOS_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Token cache directory [default: ~/.nacosctl]
    #[arg(long, global = true, env = "NACOSCTL_CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a config, or list the configs of a namespace
    Get {
        #[command(subcommand)]
        resource: GetResource,
    },
    /// Create or update a config from a file
    Apply {
        #[command(subcommand)]
        resource: ApplyResource,
    },
    /// Edit a config interactively in $EDITOR
    Edit {
        #[command(subcommand)]
        resource: EditResource,
    },
    /// Delete a config
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },
    /// Print a shell completion script
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print the dataIds starting with a prefix, one per line (used by completion scripts)
    #[command(name = "__complete-data-ids", hide = true)]
    CompleteDataIds {
        /// Prefix typed so far
        #[arg(default_value = "")]
        prefix: String,
    },
}


#[derive(Subcommand, Debug)]
pub enum GetResource {
    /// Print a config's content, or list all configs with --all
    Config {
        /// Config dataId
        data_id: Option<String>,

        /// List all configs in the namespace
        #[arg(short = 'A', long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ApplyResource {
    /// Upload a file as a config
    Config(ApplyArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Config file path
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Custom dataId (defaults to the file name)
    #[arg(short = 'd', long = "id")]
    pub data_id: Option<String>,

    /// Config type (yaml, properties, json, ...); detected from the extension by default
    #[arg(short = 't', long = "type")]
    pub config_type: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum EditResource {
    /// Edit a config
    Config {
        /// Config dataId
        data_id: String,

        /// Config type to upload with (defaults to the stored type)
        #[arg(short = 't', long = "type")]
        config_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeleteResource {
    /// Delete a config
    Config {
        /// Config dataId
        data_id: String,
    },
}

/// Connection settings for one invocation.
/// Built once in `main` and shared by reference; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: String,
    pub api_version: String,
    pub username: String,
    pub password: String,
    pub cache_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Create a config with explicit values and the default cache directory
    pub fn new(addr: &str, api_version: &str, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            addr: addr.to_string(),
            api_version: normalize_api_version(api_version),
            username: username.to_string(),
            password: password.to_string(),
            cache_dir: default_cache_dir()?,
            log_level: "warn".to_string(),
        })
    }

    /// Build the config from parsed arguments (CLI > ENV > defaults, resolved by clap)
    pub fn from_args(args: &CliArgs) -> anyhow::Result<Self> {
        let cache_dir = match args.cache_dir.as_deref() {
            Some(dir) if !dir.is_empty() => expand_tilde(dir),
            _ => default_cache_dir().context("Failed to resolve token cache directory")?,
        };

        Ok(Self {
            addr: args.addr.clone(),
            api_version: normalize_api_version(&args.api_version),
            username: args.username.clone().unwrap_or_default(),
            password: args.password.clone().unwrap_or_default(),
            cache_dir,
            log_level: args.log_level.clone(),
        })
    }

    /// Override the token cache directory
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.addr.trim().is_empty() {
            return Err(NacosError::Validation(
                "server address is required (use --addr or set NACOS_ADDR)".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether both username and password are set
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Identity used to key the token cache
    pub fn identity(&self) -> EndpointIdentity {
        EndpointIdentity {
            addr: self.addr.clone(),
            api_version: self.api_version.clone(),
            username: if self.username.is_empty() {
                None
            } else {
                Some(self.username.clone())
            },
        }
    }
}

impl CliArgs {
    /// Namespace the command runs in. Completion lookups fall back to the
    /// public namespace so they never fail on a half-typed command line.
    pub fn scope_namespace(&self) -> Result<&str> {
        match self.command {
            Command::CompleteDataIds { .. } => {
                Ok(self.namespace.as_deref().unwrap_or(crate::models::PUBLIC_NAMESPACE))
            }
            _ => self.require_namespace(),
        }
    }

    /// Namespace is mandatory for every server command
    pub fn require_namespace(&self) -> Result<&str> {
        self.namespace.as_deref().ok_or_else(|| {
            NacosError::Validation("namespace is required (use -n/--namespace)".to_string())
        })
    }
}

fn normalize_api_version(api_version: &str) -> String {
    let trimmed = api_version.trim();
    if trimmed.is_empty() {
        DEFAULT_API_VERSION.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `~/.nacosctl`
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CACHE_DIR_NAME))
        .ok_or_else(|| NacosError::Validation("could not determine home directory".to_string()))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
