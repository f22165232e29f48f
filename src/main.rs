use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ansible_akamai::akamai::ReqwestTransport;
use ansible_akamai::{run, ModuleArgs, ModuleResult};

/// Send one EdgeGrid-signed request to the Akamai API
#[derive(Debug, Parser)]
#[command(name = "akamai", version, about)]
struct Cli {
    /// JSON arguments file written by the host
    args_file: Option<PathBuf>,

    /// API path, e.g. /papi/v1/groups
    #[arg(long)]
    endpoint: Option<String>,

    /// GET, PATCH, POST or PUT
    #[arg(long)]
    method: Option<String>,

    /// edgerc section to use
    #[arg(long)]
    section: Option<String>,

    /// JSON file sent as the request body
    #[arg(long)]
    body: Option<String>,

    /// Extra headers as a JSON object
    #[arg(long)]
    headers: Option<String>,

    /// Path to the edgerc file
    #[arg(long)]
    edge_config: Option<String>,

    /// Treat every 4xx/5xx status as a failure
    #[arg(long)]
    strict_status: bool,
}

impl Cli {
    fn module_args(self) -> Result<ModuleArgs> {
        let mut args = match &self.args_file {
            Some(path) => ModuleArgs::from_file(path)?,
            None => ModuleArgs::default(),
        };

        if self.endpoint.is_some() {
            args.endpoint = self.endpoint;
        }
        if self.method.is_some() {
            args.method = self.method;
        }
        if self.section.is_some() {
            args.section = self.section;
        }
        if self.body.is_some() {
            args.body = self.body;
        }
        if let Some(headers) = self.headers {
            args.headers = Some(Value::String(headers));
        }
        if self.edge_config.is_some() {
            args.edge_config = self.edge_config;
        }
        if self.strict_status {
            args.strict_status = Some(true);
        }
        Ok(args)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<ModuleResult> {
    let args = cli.module_args()?;
    debug!("Module args: {:?}", args);
    let transport = ReqwestTransport::new()?;
    run(args, transport)
}

fn main() -> ExitCode {
    init_logging();
    let result = match Cli::try_parse() {
        Ok(cli) => execute(cli).unwrap_or_else(|e| ModuleResult::from_error(&e)),
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => ModuleResult::from_error(&anyhow!("Invalid arguments: {}", e.to_string().trim())),
    };

    let output = serde_json::to_string(&result).unwrap_or_else(|e| {
        json!({
            "failed": true,
            "changed": false,
            "msg": format!("Could not serialize result: {}", e),
        })
        .to_string()
    });
    println!("{}", output);

    ExitCode::from(result.exit_code())
}
