use crate::error::{Result, TopologyError};
use crate::resolver::Directory;
use serde::{Deserialize, Serialize};

/// A stream entry parsed back into its display parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "callSign")]
    pub call_sign: String,

    #[serde(rename = "rawStreamID", default)]
    pub raw_stream_id: String,
}

/// A directory entry split back into its host identity triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngesterHost {
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub host_type: String,
    pub stations: Vec<Station>,
}

/// Split each directory label back into `(hostname, ip, type)` and each
/// stream entry into a [`Station`].
///
/// A label without exactly two `:` separators violates the composer's
/// structural invariant and fails the whole call — that is an upstream
/// data-contract break, not a connectivity problem. `trim_suffix` removes an
/// internal domain suffix from stream entries before parsing.
pub fn ingester_hosts(
    directory: &Directory,
    trim_suffix: Option<&str>,
) -> Result<Vec<IngesterHost>> {
    let mut hosts = Vec::with_capacity(directory.assignments.len());
    for (label, streams) in &directory.assignments {
        let mut parts = label.split(':');
        let (Some(name), Some(ip), Some(host_type), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TopologyError::MalformedLabel(label.clone()));
        };

        let stations = streams
            .iter()
            .map(|entry| {
                let entry = match trim_suffix {
                    Some(suffix) if !suffix.is_empty() => entry.replacen(suffix, "", 2),
                    _ => entry.clone(),
                };
                parse_station(entry.trim())
            })
            .collect();

        hosts.push(IngesterHost {
            name: name.trim().to_string(),
            ip: ip.trim().to_string(),
            host_type: host_type.trim().to_string(),
            stations,
        });
    }
    Ok(hosts)
}

fn parse_station(entry: &str) -> Station {
    let (call_sign, raw_stream_id) = match entry.split_once(':') {
        Some((call_sign, raw)) => (call_sign, raw),
        None => (entry, ""),
    };
    Station {
        call_sign: call_sign.to_string(),
        raw_stream_id: raw_stream_id.to_string(),
    }
}
