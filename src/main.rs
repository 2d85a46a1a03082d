use clap::Parser;
use consul_sidecar::config::cli::usage_exit_code;
use consul_sidecar::core::template::IdentityTemplateResolver;
use consul_sidecar::utils::{logger, validation::Validate};
use consul_sidecar::{CliConfig, ConfigSource, Result, ServiceConfig, Sidecar, SidecarOptions};

#[tokio::main]
async fn main() {
    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting consul-sidecar");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            tracing::error!("❌ consul-sidecar failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}

async fn run(config: CliConfig) -> Result<i32> {
    config.validate()?;

    let mut service_config = match &config.config {
        Some(location) => {
            tracing::info!("📁 Loading configuration from: {}", location);
            let content = ConfigSource::parse(location)?.load().await?;
            ServiceConfig::from_toml_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    // 命令列的 service name 優先
    if let Some(name) = &config.service_name {
        service_config.service_name = Some(name.clone());
    }

    let resolver =
        IdentityTemplateResolver::from_process(config.properties(), config.command_line());
    let options = SidecarOptions {
        host: config.host.clone(),
        fixed_port: config.port,
        check_interval: config.check_interval(),
    };

    let sidecar = Sidecar::start(&service_config, &options, &resolver)?;
    tracing::info!("✅ Sidecar running on port {}", sidecar.port());

    sidecar.run_until_exit(&config.command).await
}
