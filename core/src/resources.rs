//! Machine resource pools.

use crate::{
    event::{EventBus, SaveEvent},
    records::ResourceSaveData,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource kinds. The discriminant is what a save stores.
/// NEVER renumber; only append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResourceType {
    Power = 0,
    Water = 1,
    Scrap = 2,
    Data  = 3,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [Self::Power, Self::Water, Self::Scrap, Self::Data];

    pub fn from_i32(raw: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *kind as i32 == raw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Water => "water",
            Self::Scrap => "scrap",
            Self::Data  => "data",
        }
    }
}

/// Current amount per resource kind. Amounts are not range-checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePool {
    amounts: BTreeMap<ResourceType, f32>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool holding every kind at zero.
    pub fn with_all_kinds() -> Self {
        let mut pool = Self::new();
        for kind in ResourceType::ALL {
            pool.amounts.insert(kind, 0.0);
        }
        pool
    }

    pub fn amount(&self, kind: ResourceType) -> Option<f32> {
        self.amounts.get(&kind).copied()
    }

    /// Set an amount. With `notify`, publishes `ResourceChanged`.
    pub fn set_resource(&mut self, kind: ResourceType, amount: f32, notify: bool, bus: &mut EventBus) {
        self.set_silent(kind, amount);
        if notify {
            bus.publish(SaveEvent::ResourceChanged {
                resource: kind as i32,
                amount,
            });
        }
    }

    /// Set an amount without publishing anything. Used by loads.
    pub fn set_silent(&mut self, kind: ResourceType, amount: f32) {
        self.amounts.insert(kind, amount);
    }

    /// Add `delta` to a kind (missing kinds start at zero) and notify.
    pub fn add(&mut self, kind: ResourceType, delta: f32, bus: &mut EventBus) -> f32 {
        let amount = self.amount(kind).unwrap_or(0.0) + delta;
        self.set_resource(kind, amount, true, bus);
        amount
    }

    pub fn records(&self) -> Vec<ResourceSaveData> {
        self.amounts
            .iter()
            .map(|(kind, amount)| ResourceSaveData {
                resource:       *kind as i32,
                current_amount: *amount,
            })
            .collect()
    }

    /// Apply loaded amounts silently. Returns the number of records whose
    /// resource number is unknown to this build.
    pub fn apply(&mut self, records: &[ResourceSaveData]) -> usize {
        let mut unknown = 0;
        for record in records {
            match ResourceType::from_i32(record.resource) {
                Some(kind) => self.set_silent(kind, record.current_amount),
                None => {
                    log::warn!("resource record {} is not a known resource, dropped", record.resource);
                    unknown += 1;
                }
            }
        }
        unknown
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}
