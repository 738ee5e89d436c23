use clap::Parser;
use colored::Colorize;

use notelink::cli::{Cli, Commands};
use notelink::config::init_config;
use notelink::runtime::modes;
use notelink::system::{ConsoleTarget, init_logging};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // generate-config 不需要加载配置
    if let Some(Commands::GenerateConfig { output_path, force }) = &cli.command {
        return modes::generate_config(output_path.as_deref(), *force);
    }

    let config = match init_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    let console = if cli.is_server_mode() {
        ConsoleTarget::Stdout
    } else {
        ConsoleTarget::Stderr
    };
    // guard 必须存活到进程结束，保证日志刷盘
    let _log_guard = match init_logging(&config.logging, console) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        None | Some(Commands::Serve) => modes::run_server().await,
        Some(Commands::Share { file, expires }) => modes::run_share(file.as_deref(), expires).await,
        Some(Commands::Show { slug }) => modes::run_show(&slug).await,
        Some(Commands::GenerateConfig { .. }) => unreachable!("handled before config load"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
