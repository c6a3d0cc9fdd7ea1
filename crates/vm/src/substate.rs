//! Transaction-scoped warm/cold tracking (EIP-2929) and the refund counter.

use crate::constants::gas_cost;
use ethereum_types::{Address, H256};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Default)]
pub struct Substate {
    accessed_addresses: FxHashSet<Address>,
    accessed_storage_slots: FxHashMap<Address, FxHashSet<H256>>,
    pub refunded_gas: u64,
}

impl Substate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge for touching `address` and mark it warm. The first touch pays
    /// the cold cost, every later one the warm cost.
    pub fn access_address(&mut self, address: Address) -> u64 {
        if self.accessed_addresses.insert(address) {
            gas_cost::COLD_ADDRESS_ACCESS
        } else {
            gas_cost::WARM_ADDRESS_ACCESS
        }
    }

    /// Charge for touching `(address, slot)` and mark the pair warm.
    pub fn access_storage_slot(&mut self, address: Address, slot: H256) -> u64 {
        if self
            .accessed_storage_slots
            .entry(address)
            .or_default()
            .insert(slot)
        {
            gas_cost::COLD_STORAGE_ACCESS
        } else {
            gas_cost::WARM_STORAGE_ACCESS
        }
    }

    pub fn is_address_warm(&self, address: &Address) -> bool {
        self.accessed_addresses.contains(address)
    }

    pub fn is_storage_slot_warm(&self, address: &Address, slot: &H256) -> bool {
        self.accessed_storage_slots
            .get(address)
            .is_some_and(|slots| slots.contains(slot))
    }

    /// Everything back to cold, refund counter back to zero.
    pub fn clear(&mut self) {
        self.accessed_addresses.clear();
        self.accessed_storage_slots.clear();
        self.refunded_gas = 0;
    }
}
