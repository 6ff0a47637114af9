//! Show command - print the active taxonomy of a group

use anyhow::{Result, bail};

use super::Context;
use crate::args::ShowArgs;

pub async fn execute(args: ShowArgs, ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver().await?;
    let group = resolver.group_or_default(args.group.as_deref());

    let Some(taxonomy) = resolver.load_active_taxonomy(Some(group)).await else {
        bail!(resolver.config().not_found_message(group));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&taxonomy)?);
        return Ok(());
    }

    println!(
        "Taxonomy {} v{} ({} categories, {} subcategories)",
        group,
        taxonomy.version,
        taxonomy.categories.len(),
        taxonomy.subcategory_count()
    );
    println!();

    for category in &taxonomy.categories {
        println!("{} [{}]", category.label, category.id);
        for sub in &category.children {
            println!("  - {} [{}]", sub.label, sub.id);
            if let Some(ref hint) = sub.hint {
                println!("    Hint: {}", hint);
            }
            if !sub.keywords.is_empty() {
                println!("    Keywords: {}", sub.keywords.join(", "));
            }
        }
    }

    Ok(())
}
