mod codec;
mod config;
mod graph;
mod store;
mod tui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::style::Stylize;

use crate::config::Config;
use crate::graph::state::GraphState;

#[derive(Parser)]
#[command(
    name = "hintr",
    about = "Terminal editor for branching question/answer hint files"
)]
struct Cli {
    /// Hints file to open at start
    #[arg(long)]
    path: Option<PathBuf>,
    /// Prefix for newly allocated ids
    #[arg(long, default_value = config::DEFAULT_PREFIX)]
    prefix: String,
    /// Width of the numeric part of new ids
    #[arg(long, default_value_t = config::DEFAULT_ID_DIGITS)]
    id_width: usize,
    /// Save before every change and again on exit
    #[arg(long)]
    autosave: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config {
        path: cli.path.clone(),
        prefix: cli.prefix,
        id_digits: cli.id_width,
        autosave: cli.autosave,
    };

    let mut state = GraphState::new(config.path.clone());
    if let Some(path) = &config.path
        && path.is_file()
    {
        let report = state.load_from_file(None)?;
        println!(
            "  {} {} {}",
            "Loaded".green().bold(),
            report.loaded.to_string().green().bold(),
            format!("entries from {}", path.display()).green()
        );
        for diagnostic in &report.skipped {
            eprintln!("  {} {}", "Skipped".yellow().bold(), diagnostic.as_str().dark_grey());
        }
    }

    tui::run(state, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_no_flags_given() {
        let cli = Cli::try_parse_from(["hintr"]).expect("bare invocation should parse");
        assert!(cli.path.is_none());
        assert_eq!(cli.prefix, "prefix");
        assert_eq!(cli.id_width, 4);
        assert!(!cli.autosave);
    }

    #[test]
    fn all_options_parse() {
        let cli = Cli::try_parse_from([
            "hintr",
            "--path",
            "lessons/hints.yml",
            "--prefix",
            "topic",
            "--id-width",
            "3",
            "--autosave",
        ])
        .expect("full invocation should parse");
        assert_eq!(cli.path, Some(PathBuf::from("lessons/hints.yml")));
        assert_eq!(cli.prefix, "topic");
        assert_eq!(cli.id_width, 3);
        assert!(cli.autosave);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Cli::try_parse_from(["hintr", "--watch"]).is_err());
    }
}
