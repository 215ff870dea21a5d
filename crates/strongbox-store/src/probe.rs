// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP connectivity probe.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use strongbox_core::{ConnectivityProbe, ProviderSchema, StrongboxError};
use tracing::debug;

/// Sends an authenticated GET to the schema's probe URL; any 2xx passes.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, StrongboxError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StrongboxError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn probe(
        &self,
        schema: &ProviderSchema,
        fields: &BTreeMap<String, SecretString>,
    ) -> Result<(), StrongboxError> {
        let Some(spec) = &schema.probe else {
            return Err(StrongboxError::Probe(format!(
                "provider {} declares no probe endpoint",
                schema.id
            )));
        };
        let credential = fields.get(&spec.auth_field).ok_or_else(|| {
            StrongboxError::validation(spec.auth_field.clone(), "probe credential field missing")
        })?;

        let name = HeaderName::from_bytes(spec.header.as_bytes())
            .map_err(|e| StrongboxError::Config(format!("invalid probe header name: {e}")))?;
        let mut value = HeaderValue::from_str(&format!(
            "{}{}",
            spec.prefix,
            credential.expose_secret()
        ))
        .map_err(|_| StrongboxError::validation(spec.auth_field.clone(), "not a valid header value"))?;
        value.set_sensitive(true);

        let response = self
            .client
            .get(&spec.url)
            .header(name, value)
            .send()
            .await
            .map_err(|e| StrongboxError::Probe(format!("request to {} failed: {e}", schema.id)))?;

        let status = response.status();
        debug!(provider_id = %schema.id, status = %status, "probe response received");
        if status.is_success() {
            Ok(())
        } else {
            Err(StrongboxError::Probe(format!(
                "{} rejected the credential with status {status}",
                schema.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_core::{FieldSpec, ProbeSpec, SecretKind};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn schema(url: String) -> ProviderSchema {
        ProviderSchema {
            id: "acme".into(),
            display_name: "Acme".into(),
            kind: SecretKind::ApiKey,
            fields: vec![FieldSpec::required("apiKey", "API Key")],
            probe: Some(ProbeSpec::bearer(url, "apiKey")),
        }
    }

    fn fields(key: &str) -> BTreeMap<String, SecretString> {
        BTreeMap::from([("apiKey".to_string(), SecretString::from(key.to_string()))])
    }

    fn probe() -> HttpProbe {
        HttpProbe::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn success_status_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("Authorization", "Bearer good-key"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = probe()
            .probe(&schema(format!("{}/v1/me", server.uri())), &fields("good-key"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unauthorized_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = probe()
            .probe(&schema(format!("{}/v1/me", server.uri())), &fields("bad-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, StrongboxError::Probe(_)));
        assert!(!err.to_string().contains("bad-key"));
    }

    #[tokio::test]
    async fn missing_probe_spec_fails() {
        let mut s = schema(String::new());
        s.probe = None;
        assert!(matches!(
            probe().probe(&s, &fields("k")).await,
            Err(StrongboxError::Probe(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_fails() {
        let result = probe()
            .probe(&schema("http://127.0.0.1:1/".into()), &fields("k"))
            .await;
        assert!(matches!(result, Err(StrongboxError::Probe(_))));
    }
}
