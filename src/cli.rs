use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ardf-mcp",
    version,
    about = "ARDF-aware MCP server and plan-executing agent"
)]
pub struct Cli {
    #[arg(long, short, value_enum, default_value_t = RunMode::Serve)]
    pub mode: RunMode,
    /// Configuration file; defaults to config/ardf.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Bind address override for `serve`
    #[arg(long)]
    pub addr: Option<SocketAddr>,
    /// JSON-RPC endpoint the agent talks to; without it the agent serves
    /// itself in-process
    #[arg(long)]
    pub server_url: Option<String>,
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub goal_file: Option<PathBuf>,
    /// `index` filter: descriptor type
    #[arg(long = "type")]
    pub resource_type: Option<String>,
    /// `index` filter: domain
    #[arg(long)]
    pub domain: Option<String>,
    /// `index` filter: required tag, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg()]
    pub goal: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// JSON-RPC server
    Serve,
    /// Plan and execute a goal
    Agent,
    /// Print the ARDF index
    Index,
}
