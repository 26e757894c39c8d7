pub mod admin;
pub mod consumer;
pub mod producer;

use rdkafka::ClientConfig;

/// Connection settings shared by the producer, the consumer and the admin
/// client.
#[derive(Clone, Debug)]
pub struct KafkaSettings {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".into(),
            topic: "price-updates".into(),
            group_id: "price-update-consumer".into(),
        }
    }
}

impl KafkaSettings {
    /// Base client configuration; role-specific settings are layered on
    /// top by the producer/consumer/admin constructors.
    pub fn client_config(&self) -> ClientConfig {
        let mut cfg = ClientConfig::new();
        cfg.set("bootstrap.servers", &self.bootstrap_servers);

        // Optional SASL/TLS for managed clusters.
        if let Ok(proto) = std::env::var("KAFKA_SECURITY_PROTOCOL") {
            cfg.set("security.protocol", &proto);
        }
        if let Ok(mech) = std::env::var("KAFKA_SASL_MECHANISM") {
            cfg.set("sasl.mechanisms", &mech);
        }
        if let Ok(user) = std::env::var("KAFKA_SASL_USERNAME") {
            cfg.set("sasl.username", &user);
        }
        if let Ok(pass) = std::env::var("KAFKA_SASL_PASSWORD") {
            cfg.set("sasl.password", &pass);
        }

        cfg
    }
}
