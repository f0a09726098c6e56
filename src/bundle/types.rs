//! Endpoint identifiers and bundle metadata

use crate::bundle::error::{EidError, EidResult};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Endpoint identifier of a node or application endpoint
///
/// Two schemes are understood structurally:
/// - `dtn://node/application` (node part is `dtn://node`)
/// - `ipn:node.service` (node part is `ipn:node.0`)
///
/// Any other scheme is treated as opaque and is its own node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Eid(String);

impl Eid {
    /// Parse and validate an endpoint identifier
    pub fn new(eid: impl Into<String>) -> EidResult<Self> {
        let eid = eid.into();
        if eid.is_empty() {
            return Err(EidError::Empty);
        }

        let Some((scheme, ssp)) = eid.split_once(':').filter(|(scheme, _)| !scheme.is_empty())
        else {
            return Err(EidError::MissingScheme(eid.clone()));
        };

        let malformed = || EidError::Malformed {
            scheme: scheme.to_string(),
            eid: eid.clone(),
        };

        match scheme {
            "dtn" => {
                if ssp != "none" {
                    let rest = ssp.strip_prefix("//").ok_or_else(malformed)?;
                    if rest.is_empty() || rest.starts_with('/') {
                        return Err(malformed());
                    }
                }
            }
            "ipn" => {
                let (node, service) = ssp.split_once('.').ok_or_else(malformed)?;
                if node.parse::<u64>().is_err() || service.parse::<u64>().is_err() {
                    return Err(malformed());
                }
            }
            _ => {}
        }

        Ok(Self(eid))
    }

    /// The null endpoint `dtn:none`
    pub fn none() -> Self {
        Self("dtn:none".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(s, _)| s).unwrap_or_default()
    }

    /// The node component, with any application suffix stripped
    pub fn node(&self) -> Eid {
        match self.scheme() {
            "dtn" => match self.dtn_split() {
                Some((node, _)) => Eid(node.to_string()),
                None => self.clone(),
            },
            "ipn" => match self.0.rsplit_once('.') {
                Some((node, _)) => Eid(format!("{node}.0")),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// The application suffix, if this identifier names one
    pub fn application(&self) -> Option<&str> {
        match self.scheme() {
            "dtn" => self
                .dtn_split()
                .map(|(_, app)| app)
                .filter(|app| !app.is_empty()),
            "ipn" => self
                .0
                .rsplit_once('.')
                .map(|(_, service)| service)
                .filter(|service| *service != "0"),
            _ => None,
        }
    }

    /// An endpoint on this identifier's node
    ///
    /// `dtn` nodes take any application name, `ipn` nodes a numeric service.
    pub fn endpoint(&self, application: &str) -> EidResult<Eid> {
        let node = self.node();
        match node.scheme() {
            "dtn" => Eid::new(format!("{node}/{application}")),
            "ipn" => {
                let base = node.0.rsplit_once('.').map(|(n, _)| n).unwrap_or(&node.0);
                Eid::new(format!("{base}.{application}"))
            }
            _ => Ok(node),
        }
    }

    /// Whether this identifier already names a node
    pub fn is_node(&self) -> bool {
        self.application().is_none()
    }

    /// Whether both identifiers refer to the same node
    pub fn same_node(&self, other: &Eid) -> bool {
        self.node() == other.node()
    }

    /// Splits `dtn://node/app` into `("dtn://node", "app")`
    fn dtn_split(&self) -> Option<(&str, &str)> {
        let host_start = "dtn://".len();
        if !self.0.starts_with("dtn://") {
            return None;
        }
        let slash = self.0[host_start..].find('/')? + host_start;
        Some((&self.0[..slash], &self.0[slash + 1..]))
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Eid {
    type Err = EidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Eid::new(s)
    }
}

impl TryFrom<String> for Eid {
    type Error = EidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Eid::new(value)
    }
}

impl From<Eid> for String {
    fn from(eid: Eid) -> Self {
        eid.0
    }
}

/// Seconds since the DTN epoch (2000-01-01 00:00:00 UTC)
pub fn dtn_time_now() -> u64 {
    let epoch = Utc
        .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .map(|t| t.timestamp())
        .unwrap_or(946_684_800);
    Utc::now().timestamp().saturating_sub(epoch).max(0) as u64
}

/// Identity of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleId {
    /// Source endpoint
    pub source: Eid,

    /// Creation timestamp (DTN time)
    pub timestamp: u64,

    /// Creation sequence number
    pub sequence: u64,

    /// Fragment offset, for fragments only
    pub fragment_offset: Option<u64>,
}

impl BundleId {
    pub fn new(source: Eid, timestamp: u64, sequence: u64) -> Self {
        Self {
            source,
            timestamp,
            sequence,
            fragment_offset: None,
        }
    }

    /// Create an identity stamped with the current DTN time
    pub fn now(source: Eid, sequence: u64) -> Self {
        Self::new(source, dtn_time_now(), sequence)
    }

    pub fn with_fragment(mut self, offset: u64) -> Self {
        self.fragment_offset = Some(offset);
        self
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fragment_offset {
            Some(offset) => write!(
                f,
                "[{}.{}.{}] {}",
                self.timestamp, self.sequence, offset, self.source
            ),
            None => write!(f, "[{}.{}] {}", self.timestamp, self.sequence, self.source),
        }
    }
}

/// Primary block processing flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcFlags(pub u64);

impl ProcFlags {
    pub const FRAGMENT: u64 = 0x01;
    pub const ADMINISTRATIVE_RECORD: u64 = 0x02;
    pub const DONT_FRAGMENT: u64 = 0x04;
    pub const DESTINATION_IS_SINGLETON: u64 = 0x10;

    pub fn contains(&self, flag: u64) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u64, enabled: bool) {
        if enabled {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Routing-relevant summary of a stored bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMeta {
    pub id: BundleId,

    pub destination: Eid,

    pub flags: ProcFlags,

    /// Remaining hops before the bundle must be discarded (`None` = no scope limit)
    pub hop_limit: Option<u32>,

    /// Payload size in bytes
    pub size: u64,

    /// Lifetime in seconds from creation
    pub lifetime: u64,
}

impl BundleMeta {
    /// Create metadata for a bundle addressed to a singleton destination
    pub fn new(id: BundleId, destination: Eid) -> Self {
        Self {
            id,
            destination,
            flags: ProcFlags(ProcFlags::DESTINATION_IS_SINGLETON),
            hop_limit: None,
            size: 0,
            lifetime: 3600,
        }
    }

    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.flags.set(ProcFlags::DESTINATION_IS_SINGLETON, singleton);
        self
    }

    pub fn with_hop_limit(mut self, hops: u32) -> Self {
        self.hop_limit = Some(hops);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_lifetime(mut self, lifetime: u64) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn is_singleton(&self) -> bool {
        self.flags.contains(ProcFlags::DESTINATION_IS_SINGLETON)
    }

    /// End of the bundle's lifetime in DTN time
    pub fn expires_at(&self) -> u64 {
        self.id.timestamp.saturating_add(self.lifetime)
    }

    /// True once the scope limit has been used up
    pub fn hop_limit_reached(&self) -> bool {
        self.hop_limit == Some(0)
    }

    /// True if this is a singleton bundle whose destination lives on `node`
    pub fn is_destined_for(&self, node: &Eid) -> bool {
        self.is_singleton() && self.destination.same_node(node)
    }
}

impl fmt::Display for BundleMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.id, self.destination)
    }
}
