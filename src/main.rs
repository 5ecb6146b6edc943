use std::sync::Arc;

use constants::STARTUP_TIME;
use poise::serenity_prelude::ChannelId;
use remote::RemoteClient;
use storage::{SessionStorage, Storage};
use store::QuoteStore;
use sync::Reconciler;
use tokio::sync::Mutex;

#[derive(Clone)]
struct Data {
    storage: Storage,
    session: SessionStorage,
    store: Arc<Mutex<QuoteStore>>,
    reconciler: Arc<Reconciler>,
    remote: RemoteClient,
    sync_channel_id: Option<ChannelId>,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

mod category;
mod commands;
mod constants;
mod error;
mod init;
mod models;
mod remote;
mod render;
mod storage;
mod store;
mod sync;
mod sync_tracker;
mod telemetry;
mod transfer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = &*STARTUP_TIME;

    telemetry::init_telemetry()?;

    let mut client = init::init().await?;
    client.start().await?;

    Ok(())
}
