//! Import command - publish a taxonomy file as a group's active version

use anyhow::{Context as _, Result};
use std::path::Path;
use taxonomy_kit_domain::usecases::TaxonomyPublisher;
use taxonomy_kit_domain::{SystemClock, Taxonomy};

use super::Context;
use crate::args::ImportArgs;

pub async fn execute(args: ImportArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config();
    let taxonomy = read_taxonomy(&args.file)?;

    let resolver_config = config.resolver.to_resolver_config();
    let group = args
        .group
        .clone()
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| resolver_config.default_group.clone());

    let store = ctx.open_store(&config).await?;
    let publisher = TaxonomyPublisher::new(store, SystemClock, resolver_config);

    let published = publisher
        .publish(&group, &taxonomy, args.reference.as_deref())
        .await
        .context("Failed to publish taxonomy")?;

    if published.reused {
        println!("Reusing stored record {}", published.reference);
    }
    println!(
        "Activated {} v{} for {} ({} categories)",
        published.reference,
        published.version,
        published.group,
        taxonomy.categories.len()
    );

    Ok(())
}

/// Parse a taxonomy document; `.toml` files as TOML, anything else as JSON
fn read_taxonomy(path: &Path) -> Result<Taxonomy> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read taxonomy file: {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML taxonomy: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON taxonomy: {}", path.display()))
    }
}
