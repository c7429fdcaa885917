//! CLI Commands
//!
//! Each command turns its input files into one [`CallRequest`] and hands it
//! to [`CommandContext::invoke`], which owns the session lifecycle:
//!
//! ```text
//! resolve endpoint → open session → call (Ctrl-C cancels) → close → classify
//! ```
//!
//! | Command | Operation |
//! |---------|-----------|
//! | `create` | `create_agents` / `create_mcptools` |
//! | `run` | `run_workflow` |
//! | `deploy` | `deploy_workflow` |
//! | `serve workflow` | `serve_workflow` |
//! | `serve agent` | `serve_agent` / `serve_container_agent` |

pub mod create;
pub mod deploy;
pub mod run;
pub mod serve;


use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::Instrument;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::mcp::{CallRequest, Connector, HttpConnector, Payload, Session};

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub verbose: bool,
    pub silent: bool,
    pub dry_run: bool,
    /// `--mcp-server-uri`
    pub mcp_server_uri: Option<String>,
}

/// Colored terminal output honoring `--verbose` / `--silent`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    verbose: bool,
    silent: bool,
}

impl Console {
    pub fn new(verbose: bool, silent: bool) -> Self {
        Self { verbose, silent }
    }

    /// Green line, suppressed by `--silent`.
    pub fn ok(&self, message: &str) {
        if !self.silent {
            println!("{}", message.green());
        }
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{message}");
    }

    /// Magenta line, only with `--verbose`.
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{}", message.magenta());
        }
    }

    /// Prompt on stdout and read one line from stdin, without its newline.
    ///
    /// End of input reads as an empty line.
    pub async fn read_input(&self, prompt: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let line = BufReader::new(tokio::io::stdin())
            .lines()
            .next_line()
            .await?
            .unwrap_or_default();
        Ok(line.trim_end_matches('\r').to_string())
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

/// Everything a command needs to reach the MCP server.
#[derive(Debug)]
pub struct CommandContext<C: Connector = HttpConnector> {
    options: CommandOptions,
    config: ClientConfig,
    console: Console,
    connector: C,
}

impl CommandContext<HttpConnector> {
    pub fn new(options: CommandOptions, config: ClientConfig) -> Self {
        Self::with_connector(options, config, HttpConnector::new())
    }
}

impl<C: Connector> CommandContext<C> {
    pub fn with_connector(options: CommandOptions, config: ClientConfig, connector: C) -> Self {
        let console = Console::new(options.verbose, options.silent);
        Self {
            options,
            config,
            console,
            connector,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// Run one remote operation on a fresh session.
    ///
    /// The session is closed on every path. Ctrl-C cancels the in-flight call.
    ///
    /// # Errors
    ///
    /// Any client error, or `MaestroError::ToolError` when the reply reports a failure.
    pub async fn invoke(&self, request: CallRequest) -> Result<Option<Payload>> {
        let endpoint = self
            .config
            .endpoint(self.options.mcp_server_uri.as_deref())?;
        self.console
            .verbose(&format!("Connecting to MCP server at: {endpoint}"));

        let span = tracing::debug_span!("invoke", endpoint = %endpoint, operation = request.name());

        async {
            let mut session =
                Session::open_with(&self.connector, endpoint, self.config.session_timeout())
                    .await?;
            let cancel = session.cancellation_token();

            let outcome = {
                let call = session.call(&request);
                tokio::pin!(call);
                tokio::select! {
                    outcome = &mut call => outcome,
                    Ok(()) = tokio::signal::ctrl_c() => {
                        tracing::debug!("interrupted, cancelling MCP call");
                        cancel.cancel();
                        call.await
                    }
                }
            };
            session.close().await;

            outcome?.into_result(request.name())
        }
        .instrument(span)
        .await
    }

    /// Print `OK` (unless silent) followed by the result.
    pub fn report(&self, payload: Option<&Payload>) {
        if !self.console.is_silent() {
            println!("OK");
        }
        if let Some(payload) = payload {
            println!("{payload}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_flags() {
        let console = Console::new(false, true);

        assert!(console.is_silent());
    }

    #[test]
    fn test_context_builds_console_from_options() {
        let options = CommandOptions {
            silent: true,
            ..Default::default()
        };
        let ctx = CommandContext::new(options, ClientConfig::default());

        assert!(ctx.console().is_silent());
        assert_eq!(ctx.options().mcp_server_uri, None);
    }
}
