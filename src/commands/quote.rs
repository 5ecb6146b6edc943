use poise::serenity_prelude::*;
use tracing::Instrument;

use crate::{
    category,
    constants::quotes::{LAST_VIEWED_KEY, MAX_IMPORT_BYTES},
    error::QuoteError,
    models::quotes::Quote,
    render, transfer, Context, Error,
};

async fn reply(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .reply(true)
            .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
            .content(content),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

async fn show_random(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    let selection = category::restore_selection(&data.storage)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when restoring category"))?;

    let picked = data.store.lock().await.random(&selection);

    match picked {
        Some(quote) => {
            data.session.set_json(LAST_VIEWED_KEY, &quote)?;

            ctx.send(
                poise::CreateReply::default()
                    .reply(true)
                    .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                    .embed(render::quote_embed(&quote)),
            )
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;
        }
        None => {
            reply(
                ctx,
                format!(
                    "no quotes in category \"{}\".",
                    render::category_label(&selection)
                ),
            )
            .await?;
        }
    }

    Ok(())
}

/// show a random quote from the selected category.
#[tracing::instrument(skip(ctx))]
#[poise::command(
    prefix_command,
    slash_command,
    aliases("quotes"),
    subcommands(
        "random",
        "add_quote",
        "list_quotes",
        "select_category",
        "last_viewed",
        "sync_quotes",
        "export_quotes",
        "import_quotes"
    )
)]
pub async fn quote(ctx: Context<'_>) -> Result<(), Error> {
    show_random(ctx).await
}

/// show a random quote from the selected category.
#[tracing::instrument(skip(ctx))]
#[poise::command(prefix_command, slash_command)]
pub async fn random(ctx: Context<'_>) -> Result<(), Error> {
    show_random(ctx).await
}

/// add a new quote.
#[tracing::instrument(skip(ctx))]
#[poise::command(prefix_command, slash_command, rename = "add")]
pub async fn add_quote(
    ctx: Context<'_>,
    #[description = "who said it, or what it is about"] category: String,
    #[description = "the quote itself"]
    #[rest]
    text: String,
) -> Result<(), Error> {
    let data = ctx.data();

    let result = data.store.lock().await.add(&text, &category).await;

    match result {
        Ok(quote) => {
            if data.remote.push_enabled() {
                let remote = data.remote.clone();
                let pushed = quote.clone();

                tokio::spawn(
                    async move {
                        let _ = remote.publish(&pushed).await;
                    }
                    .in_current_span(),
                );
            }

            reply(
                ctx,
                format!("added quote #{} by \"{}\".", quote.id, quote.category),
            )
            .await?;
        }
        Err(QuoteError::Validation(message)) => {
            reply(ctx, format!("{message}.")).await?;
        }
        Err(e) => {
            tracing::error!(err = ?e, "an error occurred when adding quote");
            return Err(e.into());
        }
    }

    Ok(())
}

struct PageIds {
    first: String,
    prev: String,
    next: String,
    last: String,
}

impl PageIds {
    fn new(ctx_id: u64) -> Self {
        PageIds {
            first: format!("{ctx_id}first"),
            prev: format!("{ctx_id}prev"),
            next: format!("{ctx_id}next"),
            last: format!("{ctx_id}last"),
        }
    }
}

fn page_embed(title: &str, pages: &[String], current_page: usize) -> CreateEmbed {
    CreateEmbed::default()
        .title(title)
        .description(pages[current_page].clone())
        .footer(CreateEmbedFooter::new(format!(
            "page {}/{}",
            current_page + 1,
            pages.len(),
        )))
}

fn page_buttons(ids: &PageIds, current_page: usize, page_count: usize) -> Vec<CreateActionRow> {
    let at_start = current_page == 0;
    let at_end = current_page + 1 >= page_count;

    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(&ids.first).emoji('⏮').disabled(at_start),
        CreateButton::new(&ids.prev).emoji('◀').disabled(at_start),
        CreateButton::new(&ids.next).emoji('▶').disabled(at_end),
        CreateButton::new(&ids.last).emoji('⏭').disabled(at_end),
    ])]
}

/// list the quotes in the selected category.
#[tracing::instrument(skip_all)]
#[poise::command(prefix_command, slash_command, rename = "list")]
pub async fn list_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    let selection = category::restore_selection(&data.storage)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when restoring category"))?;

    let pages = {
        let store = data.store.lock().await;
        render::list_pages(&store.filtered(&selection))
    };

    if pages.is_empty() {
        reply(
            ctx,
            format!(
                "no quotes in category \"{}\"!",
                render::category_label(&selection)
            ),
        )
        .await?;

        return Ok(());
    }

    let title = format!("quotes: {}", render::category_label(&selection));
    let ctx_id = ctx.id();
    let ids = PageIds::new(ctx_id);
    let author_id = ctx.author().id;
    let mut current_page: usize = 0;

    let msg = ctx
        .send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .embed(page_embed(&title, &pages, current_page))
                .components(page_buttons(&ids, current_page, pages.len())),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    while let Some(press) = ComponentInteractionCollector::new(ctx)
        .filter(move |press| press.data.custom_id.starts_with(&ctx_id.to_string()))
        .timeout(std::time::Duration::from_secs(60))
        .await
    {
        if press.user.id != author_id {
            press
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content("you cannot interact with another user's invoked command!")
                            .ephemeral(true),
                    ),
                )
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when creating response"),
                )?;

            continue;
        }

        if press.data.custom_id == ids.prev {
            current_page = current_page.saturating_sub(1);
        } else if press.data.custom_id == ids.next {
            current_page = (current_page + 1).min(pages.len() - 1);
        } else if press.data.custom_id == ids.first {
            current_page = 0;
        } else if press.data.custom_id == ids.last {
            current_page = pages.len() - 1;
        } else {
            continue;
        }

        press
            .create_response(
                ctx,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(page_embed(&title, &pages, current_page))
                        .components(page_buttons(&ids, current_page, pages.len())),
                ),
            )
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when creating response"),
            )?;
    }

    msg.into_message()
        .await?
        .edit(ctx, EditMessage::default().components(vec![]))
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

/// show the categories, or pick the one quotes are drawn from.
#[tracing::instrument(skip(ctx))]
#[poise::command(
    prefix_command,
    slash_command,
    rename = "category",
    aliases("filter", "author")
)]
pub async fn select_category(
    ctx: Context<'_>,
    #[description = "category to select, or \"all\""]
    #[rest]
    label: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();

    match label {
        None => {
            let selection = category::restore_selection(&data.storage)
                .await
                .inspect_err(
                    |e| tracing::error!(err = ?e, "an error occurred when restoring category"),
                )?;

            let labels = data.store.lock().await.categories();

            let listing = labels
                .iter()
                .map(|label| {
                    if *label == selection {
                        format!("- **{}** (selected)", render::category_label(label))
                    } else {
                        format!("- {}", render::category_label(label))
                    }
                })
                .collect::<Vec<String>>()
                .join("\n");

            ctx.send(
                poise::CreateReply::default()
                    .reply(true)
                    .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                    .embed(CreateEmbed::default().title("categories").description(listing)),
            )
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;
        }
        Some(label) => {
            let label = label.trim();

            let result = {
                let store = data.store.lock().await;
                category::persist_selection(&data.storage, store.quotes(), label).await
            };

            match result {
                Ok(()) => {
                    reply(
                        ctx,
                        format!(
                            "now showing quotes from \"{}\".",
                            render::category_label(label)
                        ),
                    )
                    .await?;
                }
                Err(QuoteError::Validation(message)) => {
                    reply(ctx, format!("{message}.")).await?;
                }
                Err(e) => {
                    tracing::error!(err = ?e, label = %label, "an error occurred when selecting category");
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// show the last quote viewed since the bot started.
#[tracing::instrument(skip_all)]
#[poise::command(prefix_command, slash_command, rename = "last")]
pub async fn last_viewed(ctx: Context<'_>) -> Result<(), Error> {
    let last = ctx
        .data()
        .session
        .get_json::<Quote>(LAST_VIEWED_KEY)
        .inspect_err(
            |e| tracing::warn!(err = ?e, "an error occurred when reading last viewed quote"),
        );

    match last {
        Ok(Some(quote)) => {
            ctx.send(
                poise::CreateReply::default()
                    .reply(true)
                    .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                    .content("last viewed quote:")
                    .embed(render::quote_embed(&quote)),
            )
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;
        }
        Ok(None) | Err(_) => {
            reply(ctx, "no quote viewed yet this session.").await?;
        }
    }

    Ok(())
}

/// sync quotes with the remote endpoint now.
#[tracing::instrument(skip_all)]
#[poise::command(prefix_command, slash_command, rename = "sync")]
pub async fn sync_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let msg = ctx
        .send(
            poise::CreateReply::default()
                .reply(true)
                .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
                .content("syncing quotes with server... please wait."),
        )
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    let content = match ctx.data().reconciler.reconcile().await {
        Ok(report) => format!(
            "quotes synced with server: {}",
            render::sync_summary(&report)
        ),
        Err(e) => format!("failed to sync with server: {e}"),
    };

    msg.edit(
        ctx,
        poise::CreateReply::default()
            .reply(true)
            .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
            .content(content),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when editing message"))?;

    Ok(())
}

/// download every quote as a json file.
#[tracing::instrument(skip_all)]
#[poise::command(prefix_command, slash_command, rename = "export")]
pub async fn export_quotes(ctx: Context<'_>) -> Result<(), Error> {
    let exported = {
        let store = ctx.data().store.lock().await;
        if store.is_empty() {
            None
        } else {
            Some((store.len(), transfer::export(store.quotes())?))
        }
    };

    let Some((count, bytes)) = exported else {
        reply(ctx, "there are no quotes to export yet!").await?;
        return Ok(());
    };

    ctx.send(
        poise::CreateReply::default()
            .reply(true)
            .allowed_mentions(CreateAllowedMentions::new().replied_user(false))
            .content(format!("here are all {count} quotes!"))
            .attachment(CreateAttachment::bytes(bytes, transfer::EXPORT_FILE_NAME)),
    )
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}

/// add every quote from an exported json file.
#[tracing::instrument(skip(ctx))]
#[poise::command(prefix_command, slash_command, rename = "import")]
pub async fn import_quotes(
    ctx: Context<'_>,
    #[description = "a json file made by the export command"] file: Attachment,
) -> Result<(), Error> {
    if file.size > MAX_IMPORT_BYTES {
        reply(
            ctx,
            format!("`{}` is too large to import.", file.filename),
        )
        .await?;

        return Ok(());
    }

    let bytes = file.download().await.inspect_err(
        |e| tracing::error!(err = ?e, "an error occurred when downloading attachment"),
    )?;

    let quotes = match transfer::import(&bytes) {
        Ok(quotes) => quotes,
        Err(e) => {
            tracing::warn!(err = ?e, filename = %file.filename, "rejected quotes import");
            reply(
                ctx,
                format!("couldn't read quotes from `{}`: {e}", file.filename),
            )
            .await?;

            return Ok(());
        }
    };

    let count = ctx
        .data()
        .store
        .lock()
        .await
        .import(quotes)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when importing quotes"))?;

    reply(ctx, format!("imported {count} quotes.")).await?;

    Ok(())
}
