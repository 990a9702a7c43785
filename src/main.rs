//! Marketing Command Center
//!
//! Usage:
//! - Normal mode: `command-center`
//! - With custom port: `command-center --port 3002`
//! - With custom data directory: `command-center --data-dir /var/lib/command-center`

use std::path::PathBuf;

use command_center::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--data-dir" if i + 1 < args.len() => {
                config.data_dir_override = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("Marketing Command Center - n8n webhook proxy & content calendar");
    println!();
    println!("USAGE:");
    println!("    command-center [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>        Override the listening port (env: PORT)");
    println!("    --data-dir <DIR>     Override the data directory (env: COMMAND_CENTER_DATA_DIR)");
    println!("    -h, --help           Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    N8N_BASE_URL               n8n instance URL (default http://localhost:5678)");
    println!("    N8N_API_KEY                n8n REST API key");
    println!("    N8N_WEBHOOK_<WORKFLOW>     Per-workflow webhook URL or path");
    println!("    DRIVE_LIST_WEBHOOK_URL     Media library listing webhook");
    println!("    N8N_TIMEOUT_SECS           Upstream request timeout (default 120)");
    println!("    RUST_LOG                   Log filter (default info)");
}

#[tokio::main]
async fn main() {
    let config = parse_args();
    command_center::init_tracing();

    if let Err(e) = command_center::run(config).await {
        tracing::error!(error = %format!("{:#}", e), "Command center failed");
        std::process::exit(1);
    }
}
