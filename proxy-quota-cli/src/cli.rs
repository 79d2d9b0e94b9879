use clap::{Parser, Subcommand};
use proxy_quota_types::ProviderType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "proxy-quota",
    about = "Proxy Quota - per-account quota across Antigravity, Codex and Gemini CLI",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Path to config.json (default: data directory)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    #[arg(long, global = true, help = "Management API base URL override")]
    pub management_url: Option<String>,

    #[arg(long, global = true, help = "Management key override")]
    pub management_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Fetch quota for every stored credential")]
    Refresh {
        #[arg(short, long, help = "Only refresh one provider (antigravity, codex, gemini-cli)")]
        provider: Option<ProviderType>,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,

        #[arg(short, long, help = "Also drop the cached primary API key")]
        force: bool,
    },

    #[command(about = "Print a curl command that exercises the proxy")]
    TestCommand {
        #[arg(short, long, default_value = proxy_quota_core::modules::test_command::DEFAULT_TEST_MODEL)]
        model: String,
    },

    #[command(subcommand, about = "Claude Code CLI model mapping (~/.claude/settings.json)")]
    ClaudeConfig(ClaudeConfigCommands),

    #[command(subcommand, about = "View configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ClaudeConfigCommands {
    #[command(about = "Show the current model mapping")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Set the model mapping; an empty value removes the key")]
    Set {
        #[arg(long, help = "Model for the opus tier")]
        opus: Option<String>,

        #[arg(long, help = "Model for the sonnet tier")]
        sonnet: Option<String>,

        #[arg(long, help = "Model for the haiku tier")]
        haiku: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Print the config file path")]
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refresh_flags() {
        let cli = Cli::try_parse_from(["proxy-quota", "refresh", "--provider", "gemini-cli", "--json"])
            .unwrap();
        match cli.command {
            Commands::Refresh { provider, json, force } => {
                assert_eq!(provider, Some(ProviderType::GeminiCli));
                assert!(json);
                assert!(!force);
            },
            _ => panic!("expected refresh"),
        }
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["proxy-quota", "refresh", "--provider", "claude"]).is_err());
    }

    #[test]
    fn test_claude_config_set() {
        let cli = Cli::try_parse_from(["proxy-quota", "claude-config", "set", "--opus", "gemini-3-pro-high"])
            .unwrap();
        match cli.command {
            Commands::ClaudeConfig(ClaudeConfigCommands::Set { opus, sonnet, .. }) => {
                assert_eq!(opus.as_deref(), Some("gemini-3-pro-high"));
                assert_eq!(sonnet, None);
            },
            _ => panic!("expected claude-config set"),
        }
    }
}
