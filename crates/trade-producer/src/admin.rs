//! Topic administration.

use crate::error::{AdminError, ConnectionError};
use crate::CLIENT_ID;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::ClientConfig;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::info;

/// Capability that creates topics on the broker.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    async fn create_topic(
        &self,
        name: &str,
        partitions: i32,
        replication_factor: i32,
    ) -> Result<(), AdminError>;
}

/// [`TopicAdmin`] backed by an rdkafka `AdminClient`.
///
/// Before issuing any admin request it opens a plain TCP connection to the
/// broker, so an unreachable broker surfaces as [`AdminError::Connection`]
/// instead of an admin timeout.
#[derive(Debug, Clone)]
pub struct KafkaAdmin {
    broker: String,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl KafkaAdmin {
    pub fn new(broker: &str) -> Self {
        Self {
            broker: broker.to_string(),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(10),
        }
    }

    /// Set the timeout for the control connection check.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the broker-side timeout for admin operations.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn connect(&self) -> Result<(), ConnectionError> {
        // A bootstrap list may name several brokers; only the first one is dialed.
        let address = self.broker.split(',').next().unwrap_or_default().trim();

        let connection_error = |source| ConnectionError {
            broker: address.to_string(),
            source,
        };

        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(address)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(connection_error(e)),
            Err(_) => Err(connection_error(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response within {:?}", self.connect_timeout),
            ))),
        }
    }
}

#[async_trait]
impl TopicAdmin for KafkaAdmin {
    async fn create_topic(
        &self,
        name: &str,
        partitions: i32,
        replication_factor: i32,
    ) -> Result<(), AdminError> {
        self.connect().await?;

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.broker)
            .set("client.id", CLIENT_ID)
            .create()?;

        let new_topic = NewTopic::new(
            name,
            partitions,
            TopicReplication::Fixed(replication_factor),
        );
        let opts = AdminOptions::new().operation_timeout(Some(self.operation_timeout));

        let results = admin_client.create_topics(&[new_topic], &opts).await?;
        match results.into_iter().next() {
            Some(Ok(topic)) => {
                info!(
                    "Topic '{}' created with {} partitions (replication factor {})",
                    topic, partitions, replication_factor
                );
                Ok(())
            }
            Some(Err((topic, code))) => Err(AdminError::TopicCreation { topic, code }),
            None => Err(AdminError::MissingResult {
                topic: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_broker_is_connection_error() {
        // Port 1 (tcpmux) is not served on test hosts, so the connect is refused.
        let admin = KafkaAdmin::new("127.0.0.1:1").with_connect_timeout(Duration::from_secs(2));

        let err = admin.create_topic("trades", 3, 1).await.unwrap_err();
        match err {
            AdminError::Connection(e) => assert_eq!(e.broker, "127.0.0.1:1"),
            other => panic!("expected connection error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unresolvable_broker_is_connection_error() {
        let admin = KafkaAdmin::new("no-such-host.invalid:9092")
            .with_connect_timeout(Duration::from_secs(2));

        let err = admin.create_topic("trades", 3, 1).await.unwrap_err();
        assert!(matches!(err, AdminError::Connection(_)));
    }

    #[tokio::test]
    async fn test_first_broker_of_list_is_dialed() {
        let admin = KafkaAdmin::new("127.0.0.1:1, 127.0.0.1:2")
            .with_connect_timeout(Duration::from_secs(2));

        match admin.create_topic("trades", 1, 1).await {
            Err(AdminError::Connection(e)) => assert_eq!(e.broker, "127.0.0.1:1"),
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
