//! Metadata command - version probe for a group's active taxonomy

use anyhow::{Result, bail};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::Context;
use crate::args::MetadataArgs;

pub async fn execute(args: MetadataArgs, ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver().await?;

    let Some(metadata) = resolver.taxonomy_metadata(&args.group).await else {
        bail!(resolver.config().not_found_message(&args.group));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("Group: {}", args.group);
        println!("Version: {}", metadata.version);
        println!("Timestamp: {}", format_millis(metadata.timestamp));
    }

    Ok(())
}

/// Render unix milliseconds as RFC 3339, falling back to the raw number
fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| millis.to_string())
}
