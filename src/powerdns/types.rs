use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PdnsRrset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "PTR", ...
    pub ttl: u32,
    pub changetype: Option<String>, // "REPLACE" / "DELETE" when patching
    pub records: Vec<PdnsRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String, // "192.0.2.1" or "host.example.net."
    #[serde(default)]
    pub disabled: bool,
}
