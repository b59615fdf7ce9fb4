#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::util::config::AppConfig;

mod cmd;
mod util;

fn main() -> ExitCode {
    match App::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Running median over line-oriented input
#[derive(Parser)]
#[clap(name = "runmed")]
#[clap(version)]
#[clap(subcommand_required = true, arg_required_else_help = true)]
struct App {
    /// path to the JSON config
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// path to the JSON logger targets (`{ "target": "level" }`)
    #[clap(long, global = true)]
    logger_config: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Cmd,
}

impl App {
    fn run(self) -> Result<()> {
        match self.cmd {
            Cmd::Util(cmd) => cmd.run(),
            cmd => {
                let config = AppConfig::load_or_default(self.config.as_deref())?;
                runmed_util::cli::logger::init_logger(&config.logger, self.logger_config)?;
                cmd.run(&config)
            }
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    Median(cmd::median::Cmd),

    Window(cmd::window::Cmd),

    Group(cmd::group::Cmd),

    Util(cmd::util::Cmd),
}

impl Cmd {
    fn run(self, config: &AppConfig) -> Result<()> {
        match self {
            Cmd::Median(cmd) => cmd.run(config),
            Cmd::Window(cmd) => cmd.run(config),
            Cmd::Group(cmd) => cmd.run(config),
            Cmd::Util(cmd) => cmd.run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_consistent() {
        App::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let app = App::try_parse_from([
            "runmed", "window", "--size", "3", "-t", "int8", "--config", "runmed.json", "in.txt",
        ])
        .unwrap();
        assert_eq!(app.config, Some(PathBuf::from("runmed.json")));

        let Cmd::Window(_) = app.cmd else {
            panic!("expected the window command");
        };
        assert!(App::try_parse_from(["runmed", "window", "--size", "0"]).is_err());
        assert!(App::try_parse_from(["runmed", "median", "-t", "uuid"]).is_err());
        assert!(App::try_parse_from(["runmed", "median", "--collation", "nocase"]).is_ok());
        assert!(App::try_parse_from(["runmed", "group", "--collation", "de_DE"]).is_err());
    }
}
