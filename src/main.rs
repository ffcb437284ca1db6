use anyhow::Context;
use clap::Parser;
use inquire::error::InquireResult;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod app;
mod catalog;
mod cli;
mod config;
mod semantic;
mod storage;
#[cfg(test)]
mod tests;

use app::{AppError, AppFactory, CatalogService};
use catalog::{CatalogItem, Kind, Model, Motion, Stage};
use cli::Command;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_json<S: Serialize>(value: &S) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();

    let base_path = AppFactory::base_path()?;
    let factory = AppFactory::from_base_path(&base_path)
        .with_context(|| format!("failed to initialize {}", base_path.display()))?;

    match args.command {
        Command::Refresh { kind: None } => print_json(&factory.load_app()?.refresh_all()?),
        Command::Embed { kind: None } => print_json(&factory.app()?.generate_all()?),
        command => match command_kind(&command) {
            Kind::Models => run(&factory, open::<Model>(&factory, &command)?, command),
            Kind::Stages => run(&factory, open::<Stage>(&factory, &command)?, command),
            Kind::Motions => run(&factory, open::<Motion>(&factory, &command)?, command),
        },
    }
}

/// Commands reporting what changed on disk start from the catalog as
/// persisted; everything else sees it refreshed.
fn open<T: CatalogItem>(
    factory: &AppFactory,
    command: &Command,
) -> Result<CatalogService<T>, AppError> {
    match command {
        Command::Refresh { .. } | Command::Status { .. } | Command::Purge { .. } => {
            factory.load_service()
        }
        _ => factory.service(),
    }
}

fn command_kind(command: &Command) -> Kind {
    match command {
        Command::Page { kind, .. }
        | Command::All { kind }
        | Command::Search { kind, .. }
        | Command::Status { kind }
        | Command::Purge { kind, .. } => *kind,
        Command::Refresh { kind } | Command::Embed { kind } => kind.unwrap_or(Kind::Models),
    }
}

fn run<T: CatalogItem>(
    factory: &AppFactory,
    service: CatalogService<T>,
    command: Command,
) -> anyhow::Result<()> {
    let config = factory.config();
    log::debug!("{} {} in catalog", service.total()?, T::KIND);

    match command {
        Command::Page {
            page, per_page, ..
        } => {
            let per_page = per_page.unwrap_or(config.pagination.per_page);
            print_json(&service.get_page(page, per_page)?)
        }

        Command::All { .. } => print_json(&service.get_all()?),

        Command::Refresh { .. } => print_json(&service.refresh()?),

        Command::Search { query, limit, .. } => {
            if service.is_empty()? {
                log::info!("{} catalog is empty, nothing to search", T::KIND);
            }
            let limit = limit.unwrap_or(config.search.default_limit);
            print_json(&service.search(&query, limit)?)
        }

        Command::Embed { .. } => print_json(&service.generate_embeddings()?),

        Command::Status { .. } => print_json(&service.status()?),

        Command::Purge { yes, .. } => {
            if !yes {
                let changes = service.status()?;
                if changes.is_empty() {
                    log::info!("{} catalog is clean, nothing to purge", T::KIND);
                    return Ok(());
                }

                match inquire::prompt_confirmation(format!(
                    "purge {} changed or deleted {}? (y/n)",
                    changes.len(),
                    T::KIND
                )) {
                    InquireResult::Ok(true) => {}
                    InquireResult::Ok(false) => return Ok(()),
                    InquireResult::Err(err) => return Err(err.into()),
                }
            }

            print_json(&service.purge()?)
        }
    }
}
