use anyhow::Context;
use chrono::Utc;
use open_prs::{
    Block, Config, Credentials, GitHub, Renderer, parse_args, report_owner, resolve_targets,
};
use tracing::info;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let invocation = match parse_args(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let palette = invocation.color.palette();
    colored::control::set_override(palette.is_colored());
    let mut renderer = Renderer::new(std::io::stdout().lock(), palette);

    let config = Config::discover(invocation.config.as_deref())?;
    let targets = resolve_targets(&invocation.targets, &config.targets);

    if targets.is_empty() {
        renderer.render(&[Block::Notice(
            "Nothing to report: pass OWNER or OWNER/REPO arguments or configure [owners]"
                .to_string(),
        )])?;
        return Ok(());
    }

    let credentials =
        Credentials::resolve(&config.auth).context("Failed to obtain GitHub credentials")?;
    let host = GitHub::connect(&credentials)?;
    let now = Utc::now();

    info!(owners = targets.len(), "reporting open pull requests");

    // Each owner is written as soon as it is done.
    for target in &targets {
        let blocks =
            report_owner(&target.owner, &target.spec, &host, now, invocation.options).await?;
        renderer.render(&blocks)?;
    }

    Ok(())
}
