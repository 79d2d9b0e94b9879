//! Supporting modules: configuration, primary API key cache, test command,
//! and the Claude Code model mapping.

pub mod api_key_cache;
pub mod claude_code;
pub mod config;
pub mod test_command;
