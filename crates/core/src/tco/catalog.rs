use std::collections::BTreeSet;

use crate::domain::vendor::{VendorId, VendorProfile};
use crate::errors::DomainError;

/// Read-only vendor catalog, kept in insertion order so comparative rankings
/// break ties the same way on every run.
#[derive(Clone, Debug, Default)]
pub struct VendorCatalog {
    vendors: Vec<VendorProfile>,
}

impl VendorCatalog {
    pub fn new(vendors: Vec<VendorProfile>) -> Result<Self, DomainError> {
        let mut seen = BTreeSet::new();
        for vendor in &vendors {
            vendor.validate()?;
            if !seen.insert(vendor.id.clone()) {
                return Err(DomainError::DuplicateVendor { vendor_id: vendor.id.to_string() });
            }
        }

        Ok(Self { vendors })
    }

    pub fn find(&self, vendor_id: &VendorId) -> Option<&VendorProfile> {
        self.vendors.iter().find(|vendor| &vendor.id == vendor_id)
    }

    pub fn ids(&self) -> Vec<VendorId> {
        self.vendors.iter().map(|vendor| vendor.id.clone()).collect()
    }

    pub fn flagship(&self) -> Option<&VendorProfile> {
        self.vendors.iter().find(|vendor| vendor.flagship)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}
