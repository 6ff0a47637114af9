//! Groups command - list groups with an active pointer

use anyhow::Result;

use super::Context;
use crate::args::GroupsArgs;

pub async fn execute(args: GroupsArgs, ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver().await?;
    let groups = resolver.available_groups().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else if groups.is_empty() {
        println!("No groups found.");
    } else {
        for group in &groups {
            println!("{}", group);
        }
    }

    Ok(())
}
