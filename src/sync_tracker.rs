use poise::serenity_prelude::{CreateMessage, Http};

use crate::{render, Data, Error};

/// one scheduled sync, reported to the notification channel when configured.
#[tracing::instrument(skip_all)]
pub async fn sync_tracker(http: &Http, data: &Data) -> Result<(), Error> {
    tracing::info!("started scheduled quote sync!");

    let result = data.reconciler.reconcile().await;

    let content = match &result {
        Ok(report) => format!("quotes synced with server: {}", render::sync_summary(report)),
        Err(e) => format!("failed to sync with server: {e}"),
    };

    if let Some(channel_id) = data.sync_channel_id {
        channel_id
            .send_message(http, CreateMessage::new().content(content))
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when sending message"))?;
    }

    result?;

    tracing::info!("finished scheduled quote sync!");

    Ok(())
}
