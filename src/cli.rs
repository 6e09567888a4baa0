//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable (a `.env` file in
//! the working directory is loaded first) or from the optional YAML file given
//! with `--config`. See [`crate::config`] for how they are merged.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for the article extraction server.
///
/// # Examples
///
/// ```sh
/// # Serve on the default 127.0.0.1:5000
/// OPENAI_API_KEY=sk-... awful_hn_extract
///
/// # Another port, another model, settings file
/// awful_hn_extract --bind 0.0.0.0:8080 --model gpt-4o-mini -c ./hn.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to serve the web interface on [default: 127.0.0.1:5000]
    #[arg(short, long, env = "HN_BIND")]
    pub bind: Option<SocketAddr>,

    /// Page to extract articles from [default: https://news.ycombinator.com/]
    #[arg(long, env = "HN_TARGET_URL")]
    pub target_url: Option<String>,

    /// Completion model identifier [default: gpt-4o]
    #[arg(short, long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API [default: https://api.openai.com/v1]
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// Completion service API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Where to dump the fetched HTML for inspection [default: hn_content.html]
    #[arg(long, env = "HN_DEBUG_DUMP")]
    pub debug_dump: Option<PathBuf>,

    /// Timeout for the homepage fetch, in seconds [default: 30]
    #[arg(long)]
    pub fetch_timeout_secs: Option<u64>,

    /// Timeout for the completion call, in seconds [default: 120]
    #[arg(long)]
    pub completion_timeout_secs: Option<u64>,

    /// Start even without an API key; every request then renders an error record
    #[arg(long)]
    pub allow_missing_api_key: bool,
}
