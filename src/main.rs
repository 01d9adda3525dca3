use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deal_digest::cli::{Cli, Commands, HistoryAction, SectorAction};
use deal_digest::config::Config;
use deal_digest::errors::DigestError;
use deal_digest::services::{
    CommandGitRunner, DigestService, FetchService, FilterService, HistoryService,
    ImportExportService, PublishOutcome, PublishService, RenderService, SectorService,
};
use deal_digest::sources::SourceRegistry;
use deal_digest::storage::sqlite::{
    SqliteSectorRepository, SqliteSeenDealRepository, SqliteStorage,
};

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deal_digest=info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path))?;

    match cli.command {
        Commands::Run {
            dry_run,
            output,
            json,
            publish,
            no_history,
        } => cmd_run(
            storage,
            &config,
            RunOptions {
                dry_run,
                output,
                json,
                publish,
                no_history,
            },
        ),
        Commands::Sectors { action } => {
            let service = SectorService::new(SqliteSectorRepository::new(storage));
            match action {
                SectorAction::List => cmd_sectors_list(&service),
                SectorAction::Add { name, query, url } => {
                    cmd_sectors_add(&service, &name, query, url)
                }
                SectorAction::Remove => cmd_sectors_remove(&service),
                SectorAction::Reset => cmd_sectors_reset(&service),
            }
        }
        Commands::Import { path } => cmd_import(&path, storage),
        Commands::Export { output } => cmd_export(storage, output),
        Commands::History { action, days } => {
            let service = HistoryService::new(SqliteSeenDealRepository::new(storage));
            match action {
                Some(HistoryAction::Prune { days }) => {
                    let removed = service.prune(days, Utc::now())?;
                    println!("Removed {} history entries older than {} days.", removed, days);
                    Ok(())
                }
                None => cmd_history(&service, days),
            }
        }
    }
}

struct RunOptions {
    dry_run: bool,
    output: Option<String>,
    json: Option<String>,
    publish: bool,
    no_history: bool,
}

fn cmd_run(storage: SqliteStorage, config: &Config, options: RunOptions) -> anyhow::Result<()> {
    let now = Utc::now();

    let sectors = SectorService::new(SqliteSectorRepository::new(storage.clone())).list()?;
    if sectors.is_empty() {
        println!("No sectors configured. Add one with `deal-digest sectors add`.");
        return Ok(());
    }

    let fetch_service = FetchService::new(
        SqliteSectorRepository::new(storage.clone()),
        SourceRegistry::with_timeout(config.http_timeout_secs),
        FilterService::new(config.window_hours, config.exclude_keywords.clone())?,
    );
    let digest_service = DigestService::new(
        fetch_service,
        HistoryService::new(SqliteSeenDealRepository::new(storage)),
        config,
    );

    println!("Fetching {} sectors...\n", sectors.len());

    let outcome = digest_service
        .build(now, !options.no_history)
        .context("Failed to build digest")?;
    let digest = outcome.digest;

    for (sector, error) in &outcome.failed {
        println!("  ! {}: {}", sector, error);
    }

    if options.dry_run {
        for section in &digest.sections {
            println!("{} ({} deals):", section.sector, section.deals.len());
            for deal in &section.deals {
                println!(
                    "  [DRY RUN] {} | {} | {} | {}",
                    deal.date, deal.deal_value, deal.source, deal.title
                );
            }
            println!();
        }
        println!(
            "Dry run complete. Would publish {} of {} deals.",
            digest.total_kept(),
            digest.total_found
        );
        return Ok(());
    }

    let html_path = PathBuf::from(options.output.unwrap_or_else(|| config.output_path.clone()));
    RenderService::write_html(&digest, &html_path)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;
    let mut written = vec![html_path.clone()];

    if let Some(json) = options.json {
        let json_path = PathBuf::from(json);
        RenderService::write_json(&digest, &json_path)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        written.push(json_path);
    }

    digest_service.record(&digest)?;

    println!(
        "Wrote {} deals ({} before deduplication) to {}",
        digest.total_kept(),
        digest.total_found,
        html_path.display()
    );

    if options.publish {
        let repo_dir = std::env::current_dir()?;
        let publisher = PublishService::new(CommandGitRunner::new(repo_dir), config.git.clone());
        match publisher
            .publish(&written, now.date_naive())
            .context("Failed to publish digest")?
        {
            PublishOutcome::NothingToCommit => println!("No changes to commit."),
            PublishOutcome::Pushed { message, target } => {
                println!("Committed \"{}\" and pushed {}", message, target)
            }
        }
    }

    Ok(())
}

fn cmd_sectors_list(service: &SectorService<SqliteSectorRepository>) -> anyhow::Result<()> {
    let sectors = service.list()?;

    if sectors.is_empty() {
        println!("No sectors configured.");
        return Ok(());
    }

    println!("Configured sectors:\n");
    for sector in sectors {
        println!("  {}", sector.name);
        if let Some(query) = &sector.query {
            println!("    Query: {}", query);
        }
        println!("    Feed: {}", sector.feed_url);
        println!();
    }

    Ok(())
}

fn cmd_sectors_add(
    service: &SectorService<SqliteSectorRepository>,
    name: &str,
    query: Option<String>,
    url: Option<String>,
) -> anyhow::Result<()> {
    let result = match (query, url) {
        (Some(query), _) => service.add_query(name, &query),
        (None, Some(url)) => service.add_url(name, &url),
        (None, None) => Err(DigestError::InvalidInput(
            "Either --query or --url is required".to_string(),
        )),
    };

    match result {
        Ok(sector) => {
            println!("Sector added successfully!");
            println!("  Name: {}", sector.name);
            println!("  Feed: {}", sector.feed_url);
            Ok(())
        }
        Err(DigestError::SectorAlreadyExists(_)) => {
            println!("Sector already exists: {}", name);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_sectors_remove(service: &SectorService<SqliteSectorRepository>) -> anyhow::Result<()> {
    let sectors = service.list()?;

    if sectors.is_empty() {
        println!("No sectors to remove.");
        return Ok(());
    }

    // Display numbered list
    println!("Select a sector to remove:\n");
    for (i, sector) in sectors.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, sector.name, sector.feed_url);
    }
    println!();

    // Read user input
    print!("Enter number (or 'q' to cancel): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.eq_ignore_ascii_case("q") {
        println!("Cancelled.");
        return Ok(());
    }

    let index: usize = input
        .parse()
        .map_err(|_| DigestError::InvalidInput("Invalid number".to_string()))?;

    if index == 0 || index > sectors.len() {
        return Err(DigestError::InvalidInput("Number out of range".to_string()).into());
    }

    let sector = &sectors[index - 1];
    let sector_id = sector
        .id
        .ok_or_else(|| DigestError::SectorNotFound("Sector has no ID".to_string()))?;

    service.remove(sector_id)?;
    println!("Removed: {}", sector.name);

    Ok(())
}

fn cmd_sectors_reset(service: &SectorService<SqliteSectorRepository>) -> anyhow::Result<()> {
    let sectors = service.reset()?;
    println!("Restored {} default sectors:", sectors.len());
    for sector in sectors {
        println!("  {}", sector.name);
    }
    Ok(())
}

fn cmd_import(path: &str, storage: SqliteStorage) -> anyhow::Result<()> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let service = ImportExportService::new(SqliteSectorRepository::new(storage));

    println!("Importing sectors from {}...\n", path);

    let result = service.import_opml(&content)?;

    if !result.added.is_empty() {
        println!("Added {} sectors:", result.added.len());
        for sector in &result.added {
            println!("  + {} ({})", sector.name, sector.feed_url);
        }
        println!();
    }

    if !result.duplicates.is_empty() {
        println!("Skipped {} duplicates:", result.duplicates.len());
        for name in &result.duplicates {
            println!("  - {}", name);
        }
        println!();
    }

    if !result.invalid.is_empty() {
        println!("Failed {} sectors:", result.invalid.len());
        for (name, error) in &result.invalid {
            println!("  ! {}: {}", name, error);
        }
        println!();
    }

    println!(
        "Import complete: {} added, {} duplicates, {} failed",
        result.added.len(),
        result.duplicates.len(),
        result.invalid.len()
    );

    Ok(())
}

fn cmd_export(storage: SqliteStorage, output: Option<String>) -> anyhow::Result<()> {
    let service = ImportExportService::new(SqliteSectorRepository::new(storage));
    let opml = service.export_opml()?;

    match output {
        Some(path) => {
            fs::write(&path, &opml)?;
            println!("Exported sectors to {}", path);
        }
        None => {
            println!("{}", opml);
        }
    }

    Ok(())
}

fn cmd_history(
    service: &HistoryService<SqliteSeenDealRepository>,
    days: i64,
) -> anyhow::Result<()> {
    let seen = service.recent(days, Utc::now())?;

    if seen.is_empty() {
        println!("No deals published in the last {} days.", days);
        return Ok(());
    }

    println!("Deals published in the last {} days:\n", days);
    for deal in seen {
        println!("  {} [{}] {}", deal.published_on, deal.sector, deal.title);
        println!("    {}", deal.link);
    }

    Ok(())
}
