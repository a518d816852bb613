use anyhow::{anyhow, Context, Result};
use headers::authorization::Basic;
use headers::{Authorization, HeaderMap, HeaderMapExt, HeaderName};
use http::HeaderValue;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use stats::color_response;
use std::fs;
use structopt::StructOpt;

mod options;
mod stats;

use crate::options::{Config, VolleyOptions};

use volley::{ClientBuilder, Dispatcher, Response, RunConfig};

fn main() -> Result<()> {
    let mut opts = VolleyOptions::from_args();

    // Load a potentially existing config file and merge it into the config from the CLI
    if let Some(c) = Config::load_from_file(&opts.config_file)? {
        opts.config.merge(c)
    }
    let cfg = &opts.config;
    init_logging(cfg.verbose);

    // Invalid run parameters are reported once and nothing is sent.
    // The process still exits successfully.
    let (run_config, threads) = match (cfg.run_config(), cfg.threads()) {
        (Ok(run_config), Ok(threads)) => (run_config, threads),
        (Err(e), _) => {
            println!("Error: {}", e);
            return Ok(());
        }
        (_, Err(e)) => {
            println!("Error: {}", e);
            return Ok(());
        }
    };

    let runtime = match threads {
        Some(threads) => {
            // `--threads` sizes the worker pool explicitly
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()?
        }
        None => tokio::runtime::Runtime::new()?,
    };

    runtime.block_on(run(cfg, run_config))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    // RUST_LOG takes precedence over the verbosity flag
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger might already be installed (e.g. in tests)
    let _ = builder.try_init();
}

fn show_progress(progress_bar: &Option<ProgressBar>, response: &Response) {
    let out = color_response(response);
    if let Some(pb) = progress_bar {
        pb.inc(1);
        pb.set_message(&out);
    } else {
        println!("{}", out);
    }
}

async fn run(cfg: &Config, run_config: RunConfig) -> Result<()> {
    let mut headers = parse_headers(&cfg.headers)?;
    if let Some(auth) = &cfg.basic_auth {
        let auth_header = parse_basic_auth(auth)?;
        headers.typed_insert(auth_header);
    }

    let client = ClientBuilder::default()
        .url(run_config.url())
        .user_agent(cfg.user_agent.clone())
        .allow_insecure(cfg.insecure)
        .custom_headers(headers)
        .timeout(cfg.timeout())
        .build()?;

    println!("Starting load test against {}", run_config.url());
    println!(
        "Total requests: {} | Concurrency: {}",
        run_config.requests(),
        run_config.concurrency()
    );

    let pb = if cfg.progress {
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:30.cyan/blue} {pos}/{len} requests {wide_msg}")
            .progress_chars("=> ");
        let bar = ProgressBar::new(run_config.requests() as u64).with_style(style);
        bar.enable_steady_tick(100);
        Some(bar)
    } else {
        None
    };

    let dispatcher = Dispatcher::new(run_config, client);
    let report = dispatcher
        .run_with(|response| show_progress(&pb, response))
        .await?;

    // clear the bar before the report is printed below it
    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let report_formatted = stats::fmt(&report, &cfg.format)?;
    if let Some(output) = &cfg.output {
        fs::write(output, report_formatted).context("Cannot write report to file")?;
    } else {
        println!("{}", report_formatted);
    }

    Ok(())
}

/// Split a `name=value` pair at the first `=`; the value may contain more.
fn split_header(input: &str) -> Result<(&str, &str)> {
    let mut parts = input.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(name), Some(value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(anyhow!("Invalid header {:?}, expected name=value", input)),
    }
}

fn parse_headers<T: AsRef<str>>(headers: &[T]) -> Result<HeaderMap> {
    headers.iter().try_fold(HeaderMap::new(), |mut map, header| -> Result<HeaderMap> {
        let (name, value) = split_header(header.as_ref())?;
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name {:?}", name))?;
        map.insert(name, HeaderValue::from_str(value)?);
        Ok(map)
    })
}

/// Credentials are split at the first `:`, so passwords may contain colons
fn parse_basic_auth(credentials: &str) -> Result<Authorization<Basic>> {
    let mut parts = credentials.splitn(2, ':');
    match (parts.next(), parts.next()) {
        (Some(user), Some(password)) => Ok(Authorization::basic(user, password)),
        _ => Err(anyhow!(
            "Invalid basic auth credentials, expected username:password"
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use reqwest::header;

    #[test]
    fn test_parse_custom_headers() {
        let mut custom = HeaderMap::new();
        custom.insert(header::ACCEPT, "text/html".parse().unwrap());
        assert_eq!(parse_headers(&["accept=text/html"]).unwrap(), custom);
    }

    #[test]
    fn test_header_value_keeps_equals_signs() {
        let headers = parse_headers(&["a=b=c", "x-token=YWJj=="]).unwrap();
        assert_eq!(headers["a"], "b=c");
        assert_eq!(headers["x-token"], "YWJj==");

        let headers = parse_headers(&["x-empty="]).unwrap();
        assert_eq!(headers["x-empty"], "");
    }

    #[test]
    fn test_parse_invalid_header() {
        assert!(parse_headers(&["accept"]).is_err());
        assert!(parse_headers(&["=value"]).is_err());
        assert!(parse_headers(&["bad name=value"]).is_err());
    }

    #[test]
    fn test_parse_basic_auth() {
        let mut expected = HeaderMap::new();
        expected.insert(
            header::AUTHORIZATION,
            "Basic YWxhZGluOmFicmV0ZXNlc2Ftbw==".parse().unwrap(),
        );

        let mut actual = HeaderMap::new();
        actual.typed_insert(parse_basic_auth("aladin:abretesesamo").unwrap());
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_basic_auth_password_with_colon() {
        let auth = parse_basic_auth("user:pa:ss").unwrap();
        assert_eq!(auth.username(), "user");
        assert_eq!(auth.password(), "pa:ss");
        assert!(parse_basic_auth("nopassword").is_err());
    }
}
