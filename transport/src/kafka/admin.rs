use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use tracing::info;

use super::KafkaSettings;
use crate::sink::TransportError;

/// Topic settings applied at creation time: fast-paced data with a short
/// retention.
const TOPIC_CONFIG: &[(&str, &str)] = &[
    ("compression.type", "lz4"),
    ("retention.ms", "600000"),
    ("cleanup.policy", "delete"),
    ("segment.bytes", "1073741824"),
];

/// Create the price topic if it does not exist yet.
///
/// Concurrent provisioning is safe: a topic-already-exists result counts
/// as success.
pub async fn ensure_topic(
    settings: &KafkaSettings,
    partitions: i32,
    replication: i32,
) -> Result<(), TransportError> {
    let admin: AdminClient<DefaultClientContext> = settings.client_config().create()?;

    let mut topic = NewTopic::new(
        &settings.topic,
        partitions,
        TopicReplication::Fixed(replication),
    );
    for &(key, value) in TOPIC_CONFIG {
        topic = topic.set(key, value);
    }

    let results = admin.create_topics([&topic], &AdminOptions::new()).await?;

    for result in results {
        match result {
            Ok(name) => info!(topic = %name, partitions, "topic created"),
            Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                info!(topic = %name, "topic already exists");
            }
            Err((name, code)) => {
                return Err(TransportError::Admin(format!("{name}: {code}")));
            }
        }
    }

    Ok(())
}
