use crate::{Context, Error};

const HELP_FOOTER: &str = "\
Type `q>help command` for more info on a command.
Quotes sync with the remote endpoint on a timer; `q>quote sync` runs one right away.";

/// show the commands and how to use them.
#[poise::command(slash_command, prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "command to show help about"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    let config = poise::builtins::HelpConfiguration {
        extra_text_at_bottom: HELP_FOOTER,
        show_subcommands: true,
        ..Default::default()
    };

    poise::builtins::help(ctx, command.as_deref(), config)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending help"))?;

    Ok(())
}
