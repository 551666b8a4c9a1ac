use clap::Parser;
use school_admin::utils::error::ErrorSeverity;
use school_admin::utils::logger;
use school_admin::{build_restricted_client, AdminError, CliConfig};

async fn run(config: &CliConfig) -> school_admin::Result<usize> {
    let settings = config.resolve()?;

    // 診斷工具只使用 anon key
    let client = build_restricted_client(
        &settings.supabase_url,
        &settings.anon_key,
        settings.timeout,
    )?;

    tracing::info!(
        "🔍 Querying {} (filter: {:?}, limit: {})",
        settings.query.table,
        settings.query.filter,
        settings.query.limit
    );
    let rows = client.select(&settings.query).await?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(rows.len())
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting school-admin diagnostics");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(&config).await {
        Ok(count) => {
            tracing::info!("✅ {} row(s) returned", count);
        }
        Err(e) => {
            tracing::error!("❌ Query failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());

            std::process::exit(exit_code(&e));
        }
    }
}

fn exit_code(e: &AdminError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
