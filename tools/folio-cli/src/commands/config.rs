//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, generate_sample_catalog};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match ctx.config_file {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    // Store section
    let store = &ctx.config.store;
    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("state_file", &store.state_file);
    ctx.output.kv("catalog_file", &store.catalog_file);
    ctx.output.kv("cache_file", &store.cache_file);
    if let Some(ref owner) = store.owner {
        ctx.output.kv("owner", owner);
    }

    // Pricing section
    let pricing = &ctx.config.commerce.pricing;
    ctx.output.info("");
    ctx.output.info("[pricing]");
    ctx.output.kv(
        "free_shipping_threshold",
        &pricing.free_shipping_threshold.to_string(),
    );
    ctx.output.kv("shipping_fee", &pricing.shipping_fee.to_string());
    ctx.output
        .kv("tax_rate_percent", &pricing.tax_rate_percent.to_string());
    ctx.output.kv("cod_charge", &pricing.cod_charge.to_string());

    // Payment section
    let payment = &ctx.config.commerce.payment;
    ctx.output.info("");
    ctx.output.info("[payment]");
    ctx.output.kv("success_rate", &payment.success_rate.to_string());
    ctx.output
        .kv("processing_delay_ms", &payment.processing_delay_ms.to_string());
    ctx.output.kv("timeout_ms", &payment.timeout_ms.to_string());

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("folio.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let owner = ctx.owner().ok();
    let content = generate_default_config(owner.as_ref().map(|o| o.as_str()));
    fs::write(&config_path, content)?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    let catalog_path = ctx.cwd.join("books.toml");
    if !catalog_path.exists() || force {
        fs::write(&catalog_path, generate_sample_catalog())?;
        ctx.output
            .success(&format!("Created: {}", catalog_path.display()));
    }

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = ctx.config.commerce.validate() {
        errors.push(e.to_string());
    }

    // Check the catalog loads
    let catalog_path = ctx.resolve_path(&ctx.config.store.catalog_file);
    if !catalog_path.exists() {
        warnings.push(format!(
            "catalog file {} not found; every book lookup will fail",
            catalog_path.display()
        ));
    } else {
        match ctx.load_catalog() {
            Ok(catalog) if catalog.is_empty().await => {
                warnings.push("catalog has no books".to_string());
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("{:#}", e)),
        }
    }

    let payment = &ctx.config.commerce.payment;
    if payment.processing_delay_ms >= payment.timeout_ms {
        warnings.push(format!(
            "payment.processing_delay_ms ({}) is not below payment.timeout_ms ({}); every prepaid order will fail",
            payment.processing_delay_ms, payment.timeout_ms
        ));
    }

    if ctx.config.store.owner.is_none() {
        warnings.push("store.owner is not set; pass --owner to shopper commands".to_string());
    }

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
