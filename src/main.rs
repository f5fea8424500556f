use clap::Parser;
use doc_adapter::utils::error::ErrorSeverity;
use doc_adapter::utils::{logger, validation::Validate};
use doc_adapter::{AdapterConfig, CliConfig};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting adapter-check");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = AdapterConfig::from_file(&cli.config).and_then(|config| {
        config.validate()?;
        Ok(config)
    });

    match result {
        Ok(config) => {
            print_plan(&config);
            tracing::info!("✅ {} is valid", cli.config.display());
            println!(
                "✅ {} adapters planned for '{}'",
                config.adapters.len(),
                config.generator.name
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Configuration check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn print_plan(config: &AdapterConfig) {
    tracing::info!(
        "📦 Generator '{}' -> namespace {}",
        config.generator.name,
        config.generator.namespace
    );
    if let Some(description) = &config.generator.description {
        tracing::info!("📝 {}", description);
    }

    for (position, adapter) in config.adapters.iter().enumerate() {
        let parent = adapter
            .extends
            .as_deref()
            .map(|p| format!(" extends {}Adapter", p))
            .unwrap_or_default();
        tracing::info!("{:>3}. {}Adapter{}", position + 1, adapter.model, parent);

        for (field, key) in &adapter.fields {
            let overridden = adapter
                .overrides
                .as_ref()
                .and_then(|o| o.get(field))
                .map(|name| format!(" [{}]", name))
                .unwrap_or_default();
            tracing::info!("       {} -> '{}'{}", field, key, overridden);
        }
        if let Some(identifiers) = &adapter.identifier_fields {
            tracing::info!("       identifiers: {}", identifiers.join(", "));
        }
    }
}
