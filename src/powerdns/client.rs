//! Minimal PowerDNS API client used to mirror record changes into the
//! authoritative server. Zone contents in the local database stay the source
//! of truth; every mutation pushes the affected RRset as a whole.
use crate::powerdns::types::{PdnsRecord, PdnsRrset};
use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/servers/{}/{}",
            self.base_url,
            self.server_id,
            path.trim_start_matches('/')
        )
    }

    async fn patch_rrsets(&self, zone_name: &str, rrsets: &[PdnsRrset]) -> anyhow::Result<()> {
        #[derive(Serialize)]
        struct PatchBody<'a> {
            rrsets: &'a [PdnsRrset],
        }

        let url = self.url(&format!("zones/{}", zone_name));
        let body = PatchBody { rrsets };
        let res = self
            .auth_header(self.http.patch(url))
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("PowerDNS patch_rrsets failed with {}", res.status());
        }
        Ok(())
    }

    /// Replace the entire RRset with the given records. Names must be fully
    /// qualified with a trailing dot.
    pub async fn replace_rrset(
        &self,
        zone_name: &str,
        name: &str,
        rtype: &str,
        ttl: u32,
        records: Vec<PdnsRecord>,
    ) -> anyhow::Result<()> {
        let rrset = PdnsRrset {
            name: name.to_string(),
            rrtype: rtype.to_string(),
            ttl,
            changetype: Some("REPLACE".into()),
            records,
        };
        self.patch_rrsets(zone_name, &[rrset]).await
    }

    /// Remove the entire RRset from the authoritative server.
    pub async fn delete_rrset(
        &self,
        zone_name: &str,
        name: &str,
        rtype: &str,
    ) -> anyhow::Result<()> {
        let rrset = PdnsRrset {
            name: name.to_string(),
            rrtype: rtype.to_string(),
            ttl: 0,
            changetype: Some("DELETE".into()),
            records: Vec::new(),
        };
        self.patch_rrsets(zone_name, &[rrset]).await
    }
}
