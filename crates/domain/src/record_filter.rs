use crate::record::{Record, RecordData, RecordType};
use crate::zone_name::ZoneNameResolver;

pub const MATCH_ALL: &str = "*";

/// A `*`-wildcard search string split into its literal tokens.
///
/// A target matches when every token occurs, case-insensitively, in order
/// and without overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    tokens: Vec<String>,
}

impl WildcardPattern {
    pub fn new(search: &str) -> Self {
        let tokens = search
            .split('*')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { tokens }
    }

    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty() && t != MATCH_ALL)
                .collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn matches(&self, target: &str) -> bool {
        let target = target.to_lowercase();
        let mut rest = target.as_str();
        for token in &self.tokens {
            match rest.find(token.as_str()) {
                Some(pos) => rest = &rest[pos + token.len()..],
                None => return false,
            }
        }
        true
    }
}

impl Default for WildcardPattern {
    fn default() -> Self {
        Self::new(MATCH_ALL)
    }
}

/// Selects records by type and wildcard search over their names and data.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    names: ZoneNameResolver,
    types: Vec<RecordType>,
    pattern: WildcardPattern,
}

impl RecordFilter {
    /// `types` empty or containing `ANY` accepts every type; `search`
    /// defaults to `*`.
    pub fn new(zone_name: &str, types: Vec<RecordType>, search: Option<&str>) -> Self {
        Self {
            names: ZoneNameResolver::new(zone_name),
            types,
            pattern: WildcardPattern::new(search.unwrap_or(MATCH_ALL)),
        }
    }

    pub fn match_all(zone_name: &str) -> Self {
        Self::new(zone_name, Vec::new(), None)
    }

    fn type_matches(&self, record_type: RecordType) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t.matches(record_type))
    }

    fn name_or_target_matches(&self, record: &Record, target: Option<&str>) -> bool {
        self.pattern.matches(&self.names.absolutize(&record.name))
            || target.is_some_and(|t| self.pattern.matches(&self.names.absolutize(t)))
    }

    pub fn matches(&self, record: &Record) -> bool {
        if !self.type_matches(record.record_type()) {
            return false;
        }

        match &record.data {
            RecordData::A(a) => a
                .ip_address
                .as_deref()
                .is_some_and(|ip| self.pattern.matches(ip)),
            RecordData::AAAA(aaaa) => aaaa
                .ipv6_address
                .as_deref()
                .is_some_and(|ip| self.pattern.matches(ip)),
            RecordData::PTR(ptr) => {
                self.pattern.matches(&record.name)
                    || ptr
                        .target
                        .as_deref()
                        .is_some_and(|t| self.pattern.matches(&self.names.absolutize(t)))
            }
            RecordData::TXT(txt) => {
                self.pattern.matches(&self.names.absolutize(&record.name))
                    || txt
                        .values
                        .iter()
                        .flatten()
                        .any(|value| self.pattern.matches(&self.names.absolutize(value)))
            }
            RecordData::SOA(_) => self.pattern.matches(&self.names.absolutize(&record.name)),
            RecordData::CNAME(_) | RecordData::MX(_) | RecordData::NS(_) | RecordData::SRV(_) => {
                self.name_or_target_matches(record, record.data.target())
            }
        }
    }

    pub fn filter<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Vec<Record> {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
