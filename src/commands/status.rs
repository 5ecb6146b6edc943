use std::time::UNIX_EPOCH;

use crate::{
    commands::get_bot_avatar,
    constants::{version::get_version, POISE_VERSION, STARTUP_TIME},
    render,
    sync::{SyncAttempt, SyncState, SyncStatus},
    Context, Error,
};
use poise::serenity_prelude as serenity;

fn describe_sync(status: &SyncStatus) -> String {
    let state = match status.state {
        SyncState::Idle => "idle",
        SyncState::Fetching => "fetching from remote",
        SyncState::Merging => "merging",
    };

    match &status.last_attempt {
        None => format!("{state}, no sync yet"),
        Some(SyncAttempt {
            at,
            outcome: Ok(report),
        }) => format!(
            "{state}, last synced <t:{}:R>: {}",
            at.unix_timestamp(),
            render::sync_summary(report)
        ),
        Some(SyncAttempt {
            at,
            outcome: Err(e),
        }) => format!("{state}, last sync failed <t:{}:R>: {e}", at.unix_timestamp()),
    }
}

/// get the bot's status.
#[poise::command(slash_command, prefix_command)]
#[tracing::instrument(skip_all)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let (count, categories) = {
        let store = data.store.lock().await;
        (store.len(), store.categories().len() - 1)
    };

    ctx.send(poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
        .field(
            "about the bot",
            "keeps a collection of quotes, picks random ones on request and keeps them in sync with a remote quotes endpoint. built with the [poise](https://github.com/serenity-rs/poise) framework.".to_string(),
            false
        )
        .field("version", get_version(), false)
        .field("rust", format!("[{0}](https://releases.rs/docs/{0})", rustc_version_runtime::version()), true)
        .field("poise", format!("[{0}](https://docs.rs/crate/poise/{0})", POISE_VERSION), true)
        .field("quotes stored", format!("{count} in {categories} categories"), true)
        .field("remote", data.remote.endpoint(), true)
        .field("sync", describe_sync(&data.reconciler.status()), false)
        .field("uptime", format!("<t:{}:R>", STARTUP_TIME.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()), true)
        .thumbnail(get_bot_avatar(ctx))
    ))
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending reply"))?;

    Ok(())
}
