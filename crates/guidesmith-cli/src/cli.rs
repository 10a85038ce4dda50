//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Guidesmith - turn style guides into Word templates.
#[derive(Debug, Parser)]
#[command(name = "guidesmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.guidesmith/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Language model provider (gemini, ollama, mock)
    #[arg(long, env = "GUIDESMITH_PROVIDER", global = true)]
    pub provider: Option<String>,

    /// Model name
    #[arg(long, env = "GUIDESMITH_MODEL", global = true)]
    pub model: Option<String>,

    /// API key for the provider
    #[arg(long, env = "GUIDESMITH_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract formatting rules from one or more guides
    Extract(ExtractArgs),

    /// Extract rules from a guide and write a .docx template
    Generate(GenerateArgs),

    /// Write a .docx template from a saved rules JSON file
    Render(RenderArgs),

    /// Show the default rule set
    Defaults,

    /// Write an example style guide
    Sample(SampleArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Guide files (.docx, .txt, .md)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Save the extracted rules as JSON (single file only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the generate command.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Guide file (.docx, .txt, .md)
    pub file: PathBuf,

    /// Template output path
    #[arg(short, long, default_value = "template.docx")]
    pub output: PathBuf,

    /// Also save the extracted rules as JSON
    #[arg(long)]
    pub rules_output: Option<PathBuf>,

    /// Title paragraph text
    #[arg(short, long)]
    pub title: Option<String>,

    /// Leave out the style samples and the formatting summary page
    #[arg(long)]
    pub bare: bool,
}

/// Arguments for the render command.
#[derive(Debug, Parser)]
pub struct RenderArgs {
    /// Rules JSON file, as written by `extract --output`
    pub rules: PathBuf,

    /// Template output path
    #[arg(short, long, default_value = "template.docx")]
    pub output: PathBuf,

    /// Title paragraph text
    #[arg(short, long)]
    pub title: Option<String>,

    /// Leave out the style samples and the formatting summary page
    #[arg(long)]
    pub bare: bool,
}

/// Arguments for the sample command.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_command() {
        let cli = Cli::parse_from(["guidesmith", "extract", "a.docx", "b.txt", "-o", "rules.json"]);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.output, Some(PathBuf::from("rules.json")));
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_extract_requires_a_file() {
        assert!(Cli::try_parse_from(["guidesmith", "extract"]).is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::parse_from(["guidesmith", "generate", "guide.docx"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.output, PathBuf::from("template.docx"));
                assert!(args.rules_output.is_none());
                assert!(!args.bare);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_render_bare() {
        let cli = Cli::parse_from(["guidesmith", "render", "rules.json", "--bare"]);
        match cli.command {
            Command::Render(args) => assert!(args.bare),
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "guidesmith",
            "defaults",
            "--format",
            "json",
            "-vv",
            "--provider",
            "ollama",
        ]);
        assert!(matches!(cli.command, Command::Defaults));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
    }
}
