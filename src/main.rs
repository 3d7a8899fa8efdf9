use clap::Parser;
use colored::Colorize;

use scanlinker::cli::Cli;
use scanlinker::config::{StaticConfig, get_config, init_config};
use scanlinker::errors::ScanlinkerError;
use scanlinker::runtime::modes::run_server;
use scanlinker::system::logging::init_logging;

fn print_startup_error(err: &anyhow::Error) {
    match err.downcast_ref::<ScanlinkerError>() {
        Some(e) => eprintln!("{}", e.format_colored()),
        None => eprintln!("{} {:#}", "[ERROR]".red().bold(), err),
    }
}

fn generate_config(target: &str) -> anyhow::Result<()> {
    if target == "-" {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    StaticConfig::default()
        .save_to_file(target)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", target, e))?;
    println!("{} Sample configuration written to {}", "✓".green(), target);
    Ok(())
}

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(target) = cli.generate_config.as_deref() {
        if let Err(e) = generate_config(target) {
            print_startup_error(&e);
            std::process::exit(1);
        }
        return;
    }

    init_config(cli.config.as_deref());
    let config = get_config();

    // guard 必须存活到进程结束，否则文件日志会丢失尾部
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            print_startup_error(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_server().await {
        print_startup_error(&e);
        std::process::exit(1);
    }
}
