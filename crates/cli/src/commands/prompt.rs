//! Prompt command - print the prompt block for a group

use anyhow::Result;

use super::Context;
use crate::args::PromptArgs;

pub async fn execute(args: PromptArgs, ctx: &Context) -> Result<()> {
    let resolver = ctx.resolver().await?;
    println!("{}", resolver.build_prompt_block(args.group.as_deref()).await);
    Ok(())
}
