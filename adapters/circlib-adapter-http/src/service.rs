//! [`CircuitApi`] over HTTP.

use async_trait::async_trait;
use serde_json::Value;

use circlib_catalog::{Arguments, CircuitApi};
use circlib_registry::TransportError;

use crate::api::CircuitClient;

#[async_trait]
impl CircuitApi for CircuitClient {
    async fn list_templates(&self) -> Result<Vec<Value>, TransportError> {
        Ok(self.list_circuits().await?)
    }

    async fn get_template(&self, name: &str) -> Result<Value, TransportError> {
        Ok(self.get_circuit(name).await?)
    }

    async fn materialize(
        &self,
        name: &str,
        output_format: &str,
        arguments: &Arguments,
    ) -> Result<Value, TransportError> {
        Ok(self.compile_circuit(name, output_format, arguments).await?)
    }

    async fn list_groups(&self) -> Result<Vec<Value>, TransportError> {
        Ok(self.list_families().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;

    // Port 9 (discard) on localhost is closed in test environments, so the
    // request fails at connect time.
    fn unreachable_client() -> CircuitClient {
        let config = ClientConfig::new()
            .with_endpoint("http://127.0.0.1:9")
            .with_timeout(2);
        CircuitClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client = unreachable_client();
        let err = client.list_templates().await.unwrap_err();
        assert!(err.status.is_none());
        assert!(!err.message.is_empty());
    }
}
