/// Key-naming scheme shared between the external ingestion system and the
/// resolver. Only the stream prefix varies per deployment; the lookup
/// namespaces are a fixed contract.
#[derive(Debug, Clone)]
pub struct KeyScheme {
    stream_prefix: String,
}

pub const DEFAULT_STREAM_PREFIX: &str = "nameservice:stream:";

const HOST_LOOKUP_PREFIX: &str = "hostlookup:";
const HOST_TYPE_PREFIX: &str = "hosttype:";
const ACTIVE_HOST_PREFIX: &str = "nameservice:activehost:";
const REDIRECT_PREFIX: &str = "ns:redirect:";

impl KeyScheme {
    pub fn new(stream_prefix: impl Into<String>) -> Self {
        Self {
            stream_prefix: stream_prefix.into(),
        }
    }

    /// Pattern enumerating every stream key.
    pub fn stream_pattern(&self) -> String {
        format!("{}*", self.stream_prefix)
    }

    /// Key holding the ingest IP for a stream.
    pub fn stream_key(&self, stream_id: &str) -> String {
        format!("{}{}", self.stream_prefix, stream_id)
    }

    /// Strip the stream prefix off an enumerated key.
    ///
    /// Returns `None` for keys outside the stream namespace (a pattern match
    /// should never produce one, but the resolver treats it as an anomaly
    /// rather than trusting the store).
    pub fn stream_id<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(&self.stream_prefix)
    }

    /// Key resolving an ingest IP to its hostname.
    pub fn host_lookup(&self, ip: &str) -> String {
        format!("{HOST_LOOKUP_PREFIX}{ip}")
    }

    /// Key resolving a hostname to its ingester type (e.g. `720p`).
    pub fn host_type(&self, hostname: &str) -> String {
        format!("{HOST_TYPE_PREFIX}{hostname}")
    }

    /// Key holding the currently-active host of a primary/backup pair.
    pub fn active_host(&self, stream_id: &str) -> String {
        format!("{ACTIVE_HOST_PREFIX}{stream_id}")
    }

    /// Hash key holding the redirect snapshot for a redirect group.
    pub fn redirect_hash(&self, group: &str) -> String {
        format!("{REDIRECT_PREFIX}{group}")
    }
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_PREFIX)
    }
}
