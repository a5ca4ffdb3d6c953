use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::{render::Palette, report::ReportOptions};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

const AFTER_HELP: &str = "\
Examples:
  open-prs                               report every owner from the configuration
  open-prs symfony                       all public repositories of 'symfony'
  open-prs phpcr/phpcr-utils doctrine/phpcr-odm

Owners may be users or organizations.";

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn palette(self) -> Palette {
        let enabled = match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        };
        if enabled {
            Palette::colored()
        } else {
            Palette::plain()
        }
    }
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "open-prs",
    about = "List open pull requests across GitHub users and organizations, highlighting the stale ones"
)]
#[command(long_version = BUILD_INFO_HUMAN, after_help = AFTER_HELP)]
struct CliArgs {
    /// OWNER or OWNER/REPO to report on (overrides the configured owners)
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Configuration file (default: $OPEN_PRS_CONFIG, ./.open-prs.toml, then the user config directory)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also report forked repositories, marked "(forked)"
    #[arg(long = "include-forks")]
    pub include_forks: bool,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, value_name = "WHEN")]
    pub color: ColorChoice,
}

/// Everything one run needs from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub targets: Vec<String>,
    pub config: Option<PathBuf>,
    pub color: ColorChoice,
    pub options: ReportOptions,
}

/// Parses command-line arguments (including the program name) into an
/// [`Invocation`]. Help and version requests surface as `clap::Error`.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;

    Ok(Invocation {
        targets: cli.targets,
        config: cli.config,
        color: cli.color,
        options: ReportOptions {
            include_forks: cli.include_forks,
        },
    })
}
