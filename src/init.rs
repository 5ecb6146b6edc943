use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use futures::StreamExt;
use poise::serenity_prelude::{self as serenity, ChannelId, Client, ClientBuilder};
use tokio::{
    sync::Mutex,
    time::{Instant, MissedTickBehavior},
};
use tracing::Instrument;

use crate::{
    commands,
    constants::quotes::{
        DEFAULT_API_LIMIT, DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, DEFAULT_DATABASE_URL,
        DEFAULT_SYNC_INTERVAL_SECS,
    },
    remote::{RemoteClient, RemoteConfig},
    storage::{SessionStorage, Storage},
    store::QuoteStore,
    sync::Reconciler,
    sync_tracker, Data,
};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %raw, "couldn't parse environment variable, using the default.");
            default
        }),
        Err(_) => default,
    }
}

async fn init_store() -> anyhow::Result<(Storage, QuoteStore)> {
    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let storage = Storage::open(&db_url).await?;
    let store = QuoteStore::load(storage.clone()).await?;

    Ok((storage, store))
}

fn init_remote() -> anyhow::Result<RemoteClient> {
    tracing::info!("initializing remote quotes client...");

    let config = RemoteConfig {
        endpoint: std::env::var("QUOTES_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        limit: env_or("QUOTES_API_LIMIT", DEFAULT_API_LIMIT),
        timeout: Duration::from_secs(env_or("QUOTES_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)),
        push: env_or("QUOTES_REMOTE_PUSH", false),
    };

    tracing::info!(
        endpoint = %config.endpoint,
        limit = config.limit,
        push = config.push,
        "syncing quotes with remote endpoint."
    );

    Ok(RemoteClient::new(config)?)
}

fn init_channel_id() -> Option<ChannelId> {
    let sync_channel_id = std::env::var("SYNC_NOTIFY_CHANNEL_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok())
        .map(|id| {
            tracing::info!("sending quote sync updates to channel with id {}.", id);
            ChannelId::new(id)
        });

    if sync_channel_id.is_none() {
        tracing::warn!("no channel id found for quote sync updates. they will not be sent.");
    }

    sync_channel_id
}

async fn init_discord_client(token: &str, data: Data) -> anyhow::Result<Client> {
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::help::help(),
                commands::status::status(),
                commands::quote::quote(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("q>".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when registering commands"))?;

                Ok(data)
            }.in_current_span())
        })
        .build();

    let client = ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(serenity::ActivityData {
            name: "q>quote".into(),
            kind: serenity::ActivityType::Listening,
            state: None,
            url: None,
        })
        .await?;

    Ok(client)
}

fn spawn_background_tasks(client: &Client, data: &Data, period: Duration) {
    let sync_data = data.clone();
    let sync_http = client.http.clone();

    tracing::info!(period_secs = period.as_secs(), "initialized quote sync tracker!");

    tokio::spawn(
        async move {
            // the first sync runs one full period after startup.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let task = futures::stream::unfold(interval, |mut interval| async {
                interval.tick().await;

                let _ = sync_tracker::sync_tracker(&sync_http, &sync_data).await;
                Some(((), interval))
            });

            task.for_each(|_| async {}).await;
        }
        .in_current_span(),
    );
}

pub async fn init() -> anyhow::Result<Client> {
    tracing::info!("initializing... please wait.");

    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;

    let (storage, store) = init_store().await?;
    let remote = init_remote()?;
    let sync_channel_id = init_channel_id();
    let period = Duration::from_secs(
        env_or("QUOTES_SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS).max(1),
    );

    let store = Arc::new(Mutex::new(store));
    let reconciler = Arc::new(Reconciler::new(remote.clone(), store.clone()));

    let data = Data {
        storage,
        session: SessionStorage::default(),
        store,
        reconciler,
        remote,
        sync_channel_id,
    };

    let client = init_discord_client(&token, data.clone()).await?;
    spawn_background_tasks(&client, &data, period);

    tracing::info!("finished initializing!");
    Ok(client)
}
