//! Maestro CLI - agent and workflow operations through the Maestro MCP server

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use maestro::commands::deploy::{DeployArgs, DeployTarget, DEFAULT_DEPLOY_URL};
use maestro::commands::run::RunArgs;
use maestro::commands::serve::{ServeAgentArgs, ServeWorkflowArgs, DEFAULT_HOST, DEFAULT_PORT};
use maestro::commands::{create, deploy, run, serve, CommandContext, CommandOptions};
use maestro::config::{set_dry_run_env, ClientConfig};
use maestro::error::{FixSuggestion, MaestroError};
use maestro::runlog::RunLogger;

#[derive(Parser)]
#[command(name = "maestro")]
#[command(about = "Maestro - create, run, deploy, and serve agent workflows")]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    silent: bool,

    /// Ask the server not to perform real side effects (sets DRY_RUN=True)
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct ServerArgs {
    /// Maestro MCP server URI (overrides MAESTRO_MAESTRO_MCP_SERVER_URI)
    #[arg(long)]
    mcp_server_uri: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create agents or MCP tools from a YAML file
    Create {
        /// Path to agents (or MCP tools) YAML file
        agents_file: PathBuf,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Run a workflow with specified agents and workflow files
    Run {
        /// `[AGENTS_FILE] WORKFLOW_FILE`
        #[arg(required = true, num_args = 1..=2, value_names = ["AGENTS_FILE", "WORKFLOW_FILE"])]
        files: Vec<PathBuf>,

        /// Read a user prompt and execute the workflow with it
        #[arg(long)]
        prompt: bool,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Deploy a workflow to Docker, Kubernetes, or Streamlit
    Deploy {
        agents_file: PathBuf,

        workflow_file: PathBuf,

        /// Environment variables for the deployment (KEY=VALUE)
        env: Vec<String>,

        /// Deploy to Docker
        #[arg(long)]
        docker: bool,

        /// Deploy to Kubernetes
        #[arg(long, alias = "kubernetes")]
        k8s: bool,

        /// Deploy as Streamlit application (default)
        #[arg(long)]
        streamlit: bool,

        /// Run the prompt by default once deployed
        #[arg(long)]
        auto_prompt: bool,

        /// The deployment URL
        #[arg(long, default_value = DEFAULT_DEPLOY_URL)]
        url: String,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Serve agents or workflows via HTTP endpoints
    Serve {
        #[command(subcommand)]
        target: ServeTarget,
    },
}

#[derive(Subcommand)]
enum ServeTarget {
    /// Serve one agent
    Agent {
        agents_file: PathBuf,

        /// Specific agent name to serve (if multiple in file)
        #[arg(long)]
        agent_name: Option<String>,

        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to serve on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Serve a workflow
    Workflow {
        agents_file: PathBuf,

        workflow_file: PathBuf,

        /// Host to bind to
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to serve on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(flatten)]
        server: ServerArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = run_cli(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_cli(cli: Cli) -> Result<(), MaestroError> {
    ClientConfig::load_env_file()?;
    if cli.dry_run {
        set_dry_run_env();
    }

    let config = ClientConfig::from_env();
    let options = |server: ServerArgs| CommandOptions {
        verbose: cli.verbose,
        silent: cli.silent,
        dry_run: cli.dry_run,
        mcp_server_uri: server.mcp_server_uri,
    };

    match cli.command {
        Commands::Create {
            agents_file,
            server,
        } => {
            let ctx = CommandContext::new(options(server), config);
            create::execute(&ctx, &agents_file).await
        }
        Commands::Run {
            files,
            prompt,
            server,
        } => {
            let mut files = files.into_iter();
            let (Some(first), second) = (files.next(), files.next()) else {
                return Err(MaestroError::ConfigError {
                    reason: "run needs a workflow file".to_string(),
                });
            };
            let args = RunArgs {
                prompt,
                ..RunArgs::from_positionals(first, second)
            };

            let ctx = CommandContext::new(options(server), config);
            run::execute(&ctx, &args, &RunLogger::new()).await
        }
        Commands::Deploy {
            agents_file,
            workflow_file,
            env,
            docker,
            k8s,
            streamlit: _,
            auto_prompt,
            url,
            server,
        } => {
            let args = DeployArgs {
                agents_file,
                workflow_file,
                env,
                target: DeployTarget::from_flags(docker, k8s),
                auto_prompt,
                url,
            };

            let ctx = CommandContext::new(options(server), config);
            deploy::execute(&ctx, &args).await
        }
        Commands::Serve { target } => match target {
            ServeTarget::Agent {
                agents_file,
                agent_name,
                host,
                port,
                server,
            } => {
                let args = ServeAgentArgs {
                    agents_file,
                    agent_name,
                    host,
                    port,
                };

                let ctx = CommandContext::new(options(server), config);
                serve::execute_agent(&ctx, &args).await
            }
            ServeTarget::Workflow {
                agents_file,
                workflow_file,
                host,
                port,
                server,
            } => {
                let args = ServeWorkflowArgs {
                    agents_file,
                    workflow_file,
                    host,
                    port,
                };

                let ctx = CommandContext::new(options(server), config);
                serve::execute_workflow(&ctx, &args).await
            }
        },
    }
}
