mod cli;

use basebatch::{archiver, config, discovery, runner};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "basebatch=debug".to_string()
        } else {
            "basebatch=info".to_string()
        }
    });

    // Logs go to stderr so stdout stays machine-readable (--json)
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            input_dir,
            dry_run,
            json,
        } => run_batch(&input_dir, cli.config.as_deref(), dry_run, json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("basebatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_batch(
    input_dir: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let archiver_cmd = archiver::ArchiverCommand::from_config(&config.archiver)?;

    let files = discovery::discover_captures(input_dir);
    tracing::info!("Discovered {} capture files in {:?}", files.len(), input_dir);

    if dry_run {
        let batches = runner::partition(&files, config.batch.size);
        println!(
            "[DRY RUN] {} files in {} batches of up to {}",
            files.len(),
            batches.len(),
            config.batch.size
        );
        for (i, batch) in batches.iter().enumerate() {
            println!("Batch {}:", i + 1);
            for file in batch {
                println!("  {}", archiver_cmd.render(file));
            }
        }
        return Ok(());
    }

    // Resolve the archiver before spawning anything
    if !files.is_empty() {
        archiver::resolve_archiver(&archiver_cmd.command)?;
    }

    let batch_runner = runner::BatchRunner::new(archiver_cmd, &config.batch);
    let report = batch_runner.run(files);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }

    if !report.all_succeeded() {
        anyhow::bail!(
            "{} of {} conversions did not complete successfully",
            report.jobs.len() - report.succeeded(),
            report.jobs.len()
        );
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let info = archiver::check_tool(&config.archiver.command);

    let status = if info.available { "✓" } else { "✗" };
    print!("{} {}", status, info.name);
    if let Some(ref version) = info.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = info.path {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if info.available {
        println!("The archiver is available!");
        Ok(())
    } else {
        anyhow::bail!(
            "{} was not found; install it or set archiver.command in the config",
            info.name
        )
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Archiver: {}", config.archiver.command);
    match &config.archiver.config_path {
        Some(p) => println!("  Archiver config: {}", p.display()),
        None => println!("  Archiver config: (unset)"),
    }
    match &config.archiver.output_root {
        Some(p) => println!("  Output root: {}", p.display()),
        None => println!("  Output root: (unset)"),
    }
    println!("  Batch size: {}", config.batch.size);
    println!("  Launch stagger: {}s", config.batch.launch_stagger_secs);
    match config.batch.job_timeout_secs {
        Some(t) => println!("  Job timeout: {}s", t),
        None => println!("  Job timeout: none"),
    }

    Ok(())
}
