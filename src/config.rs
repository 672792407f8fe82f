use clap::Args;
use std::net::SocketAddr;

/// Settings shared by the server and the CLI.
/// Every flag can also come from the environment.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Database connection string (`sqlite://<path>`, a path, or `:memory:`)
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://expenses.db")]
    pub database: String,

    /// Log level or filter directive
    #[arg(long, env = "EXPENSES_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "EXPENSES_LOG_JSON")]
    pub log_json: bool,
}

/// HTTP listener settings, only accepted by the server binary
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to
    #[arg(long, env = "EXPENSES_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "EXPENSES_PORT", default_value_t = 8000)]
    pub port: u16,
}

impl ServerArgs {
    pub fn listen_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid listen address {}:{}: {}", self.host, self.port, e))
    }
}
