//! Classify command - one-shot rule-based classification

use anyhow::{Context as _, Result};
use std::io::{self, Read};
use std::path::Path;
use taxonomy_kit_domain::usecases::classify::CLASSIFIER_VERSION;
use taxonomy_kit_domain::usecases::{RuleClassifier, TaxonomyConstraint};

use super::Context;
use crate::args::ClassifyArgs;

pub async fn execute(args: ClassifyArgs, ctx: &Context) -> Result<()> {
    let text = get_input_text(&args)?;

    let constraint = match args.constraint {
        Some(ref path) => load_constraint(path)?,
        None => active_constraint(ctx, args.group.as_deref()).await?,
    };

    tracing::info!(
        classifier_version = CLASSIFIER_VERSION,
        categories = constraint.len(),
        text_length = text.len(),
        "Classifying text"
    );

    let output = RuleClassifier::default().classify(Some(text.as_str()), &constraint);

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        println!("Classification Results");
        println!("======================");
        println!();
        println!("Category: {}", output.category);
        println!("Subcategory: {}", output.subcategory);
        println!("Confidence: {:.2}", output.confidence);
        println!("Rationale: {}", output.rationale);
    }

    Ok(())
}

/// Constraint derived from the active taxonomy of `group`; empty if none
async fn active_constraint(ctx: &Context, group: Option<&str>) -> Result<TaxonomyConstraint> {
    let resolver = ctx.resolver().await?;
    let group = resolver.group_or_default(group);

    match resolver.load_active_taxonomy(Some(group)).await {
        Some(taxonomy) => Ok(TaxonomyConstraint::from_taxonomy(&taxonomy)),
        None => {
            tracing::warn!(group = %group, "No active taxonomy; every rule match will fall back");
            Ok(TaxonomyConstraint::new())
        }
    }
}

fn load_constraint(path: &Path) -> Result<TaxonomyConstraint> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read constraint file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Constraint file is not valid JSON: {}", path.display()))?;
    Ok(TaxonomyConstraint::from_json(&value))
}

fn get_input_text(args: &ClassifyArgs) -> Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    if let Some(ref path) = args.file {
        if path.as_os_str() == "-" {
            return read_stdin();
        }

        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    // Default to stdin if no input specified
    read_stdin()
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read from stdin")?;
    Ok(text)
}
