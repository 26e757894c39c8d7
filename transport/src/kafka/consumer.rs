use corelib::models::PriceUpdate;
use corelib::validation::validate;
use engine::channel::PriceSender;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tokio::sync::watch;
use tracing::{info, warn};

use super::KafkaSettings;
use crate::sink::TransportError;

/// Build the stream consumer subscribed to the price topic.
pub fn price_consumer(settings: &KafkaSettings) -> Result<StreamConsumer, TransportError> {
    let consumer: StreamConsumer = settings
        .client_config()
        .set("group.id", &settings.group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .set("fetch.min.bytes", "32768")
        .set("max.partition.fetch.bytes", "1048576")
        .create()?;

    consumer.subscribe(&[settings.topic.as_str()])?;
    Ok(consumer)
}

/// Forward consumed updates into the ingestion channel until shutdown.
///
/// A malformed, undecodable or invalid message is logged and skipped;
/// one bad message never stalls the loop. The bridge also validates, so
/// the engine sees only well-formed updates regardless of what the topic
/// carries.
pub async fn run_consumer_bridge(
    consumer: StreamConsumer,
    tx: PriceSender,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("kafka consumer bridge started");

    loop {
        let received = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            received = consumer.recv() => received,
        };

        let message = match received {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "consume failed");
                continue;
            }
        };

        let Some(payload) = message.payload() else {
            warn!("skipping message with empty payload");
            continue;
        };

        let update: PriceUpdate = match serde_json::from_slice(payload) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "skipping undecodable price update");
                continue;
            }
        };

        if let Err(e) = validate(&update) {
            warn!(symbol = %update.symbol, error = %e, "skipping invalid price update");
            continue;
        }

        if tx.send(update).await.is_err() {
            // Reader gone; nothing left to feed.
            break;
        }
    }

    info!("kafka consumer bridge stopped");
}
