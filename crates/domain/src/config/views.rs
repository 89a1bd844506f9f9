use serde::{Deserialize, Serialize};

use crate::record::ZoneType;
use crate::zone::{Resolver, View, Zone};

/// A `[[views]]` table: resolvers in failover order plus the zones served.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    pub name: String,

    #[serde(default)]
    pub resolvers: Vec<Resolver>,

    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// A `[[views.zones]]` table. Keys are names of `[[tsig_keys]]` entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    pub name: String,

    #[serde(rename = "type", default)]
    pub zone_type: ZoneType,

    #[serde(default)]
    pub query_key: Option<String>,

    #[serde(default)]
    pub transfer_key: Option<String>,

    #[serde(default)]
    pub update_key: Option<String>,
}

impl ViewConfig {
    pub fn to_view(&self) -> View {
        View {
            name: self.name.clone(),
            resolvers: self.resolvers.clone(),
        }
    }

    pub fn to_zones(&self) -> Vec<Zone> {
        self.zones
            .iter()
            .map(|z| Zone {
                query_key: z.query_key.clone(),
                transfer_key: z.transfer_key.clone(),
                update_key: z.update_key.clone(),
                ..Zone::new(z.name.clone(), z.zone_type, self.name.clone())
            })
            .collect()
    }

    /// Key names referenced by this view's zones and resolvers.
    pub fn referenced_keys(&self) -> impl Iterator<Item = &str> {
        self.zones
            .iter()
            .flat_map(|z| [&z.query_key, &z.transfer_key, &z.update_key])
            .chain(self.resolvers.iter().map(|r| &r.tsig_key))
            .filter_map(|k| k.as_deref())
    }
}
