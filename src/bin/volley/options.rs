use anyhow::{anyhow, Error, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::convert::TryFrom;
use std::str::FromStr;
use std::time::Duration;
use std::{fs, io::ErrorKind, path::PathBuf};
use structopt::StructOpt;
use volley::{RunConfig, USER_AGENT};

const REQUESTS: i64 = 100;
const CONCURRENCY: i64 = 10;
const PACING: u64 = 100;

#[derive(Debug, Deserialize, PartialEq)]
pub enum Format {
    String,
    Json,
}

impl FromStr for Format {
    type Err = Error;
    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format {
            "string" => Ok(Format::String),
            "json" => Ok(Format::Json),
            _ => Err(anyhow!("Could not parse format {}", format)),
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::String
    }
}

// this exists because structopt requires `&str` type values for defaults
// (we can't use e.g. `REQUESTS` or `requests()` which gets created for serde)
lazy_static! {
    static ref REQUESTS_STR: String = REQUESTS.to_string();
    static ref CONCURRENCY_STR: String = CONCURRENCY.to_string();
    static ref PACING_STR: String = PACING.to_string();
}

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    requests: i64 = REQUESTS;
    concurrency: i64 = CONCURRENCY;
    pacing: u64 = PACING;
    user_agent: String = USER_AGENT.to_string();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ( $cli:ident , $toml:ident ; $( $key:ident : $default:expr; )* ) => {
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "volley",
    about = "A bounded-concurrency HTTP load generator.\n\n\
             Sends a fixed number of GET requests to a URL and reports the status codes."
)]
pub(crate) struct VolleyOptions {
    /// Configuration file to use
    #[structopt(long = "config", default_value = "./volley.toml")]
    pub config_file: String,

    #[structopt(flatten)]
    pub config: Config,
}

#[derive(Debug, Deserialize, StructOpt)]
pub struct Config {
    /// URL of the service under test
    #[structopt(short, long)]
    #[serde(default)]
    pub url: Option<String>,

    /// Total number of requests to send
    #[structopt(short = "n", long, default_value = &REQUESTS_STR)]
    #[serde(default = "requests")]
    pub requests: i64,

    /// Maximum number of requests in flight at the same time
    #[structopt(short, long, default_value = &CONCURRENCY_STR)]
    #[serde(default = "concurrency")]
    pub concurrency: i64,

    /// Delay in milliseconds after each request, once its slot is released
    #[structopt(short, long, default_value = &PACING_STR)]
    #[serde(default = "pacing")]
    pub pacing: u64,

    /// Proceed for server connections considered insecure (invalid TLS)
    #[structopt(short, long)]
    #[serde(default)]
    pub insecure: bool,

    /// User agent
    #[structopt(short = "a", long, default_value = USER_AGENT)]
    #[serde(default = "user_agent")]
    pub user_agent: String,

    /// Custom request headers
    #[structopt(short = "H", long)]
    #[serde(default)]
    pub headers: Vec<String>,

    /// Basic authentication support. E.g. `username:password`
    #[structopt(long)]
    #[serde(default)]
    pub basic_auth: Option<String>,

    /// Request timeout in seconds, from connect to response finished.
    /// Without it the HTTP client's own defaults apply
    #[structopt(short, long)]
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Number of threads to utilize.
    /// Defaults to number of cores available to the system
    #[structopt(short = "T", long)]
    #[serde(default)]
    pub threads: Option<usize>,

    /// Verbose program output
    #[structopt(short, long)]
    #[serde(default)]
    pub verbose: bool,

    /// Show a progress bar instead of one line per request
    #[structopt(long)]
    #[serde(default)]
    pub progress: bool,

    /// Output file of the report
    #[structopt(short, long, parse(from_os_str))]
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Output format of the report (json, string)
    #[structopt(short, long, default_value = "string")]
    #[serde(default)]
    pub format: Format,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &str) -> Result<Option<Config>> {
        // Read configuration file
        let result = fs::read(path);

        // Ignore a file not found error
        let contents = match result {
            Ok(c) => c,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::NotFound => Ok(None),
                    _ => Err(Error::from(e)),
                }
            }
        };

        Ok(Some(toml::from_slice(&contents)?))
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        fold_in! {
            // Destination and source configs
            self, toml;

            // Keys with defaults to assign
            url: None;
            requests: REQUESTS;
            concurrency: CONCURRENCY;
            pacing: PACING;
            insecure: false;
            user_agent: USER_AGENT;
            headers: Vec::<String>::new();
            basic_auth: None;
            timeout: None;
            threads: None;
            verbose: false;
            progress: false;
            output: None;
            format: Format::String;
        }
    }

    /// Validate the run parameters.
    /// Negative counts are rejected the same way as zero.
    pub(crate) fn run_config(&self) -> volley::Result<RunConfig> {
        let requests = usize::try_from(self.requests).unwrap_or(0);
        let concurrency = usize::try_from(self.concurrency).unwrap_or(0);
        let url = self.url.as_deref().unwrap_or_default();
        let run_config = RunConfig::new(url, requests, concurrency)?;
        Ok(run_config.with_pacing(Duration::from_millis(self.pacing)))
    }

    /// Worker threads for the runtime; `None` leaves the choice to tokio
    pub(crate) fn threads(&self) -> Result<Option<usize>> {
        match self.threads {
            Some(0) => Err(anyhow!("the number of threads must be greater than zero")),
            threads => Ok(threads),
        }
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
