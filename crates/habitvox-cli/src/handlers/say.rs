//! Say command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, words: &[String]) -> Result<(), CliError> {
    let text = words.join(" ");
    ctx.dispatcher.speak(&text).await?;
    if let Some(provider) = ctx.dispatcher.active_provider() {
        println!("Spoken with {provider}");
    }
    Ok(())
}
