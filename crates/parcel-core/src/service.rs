//! Parcel tracker workflows built on the store

use tracing::info;

use crate::error::{Result, StateError};
use crate::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::persistence::ParcelStore;

/// Tracker operations as exposed to users
pub struct ParcelService<'a> {
    store: ParcelStore<'a>,
}

impl<'a> ParcelService<'a> {
    pub fn new(store: ParcelStore<'a>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &ParcelStore<'a> {
        &self.store
    }

    /// Register a new parcel stamped with the current time and return the
    /// record as stored
    pub fn register(&self, client: ClientId, address: &str) -> Result<Parcel> {
        let number = self.store.add(&Parcel::registered_now(client, address))?;
        let parcel = self.store.get(number)?;

        info!(
            number = parcel.number,
            client,
            address = %parcel.address,
            "registered parcel"
        );
        Ok(parcel)
    }

    /// All parcels of a client
    pub fn client_parcels(&self, client: ClientId) -> Result<Vec<Parcel>> {
        self.store.get_by_client(client)
    }

    /// Advance a parcel to the next status and return it.
    ///
    /// A delivered parcel has no next status and is reported as an illegal
    /// transition.
    pub fn next_status(&self, number: ParcelNumber) -> Result<ParcelStatus> {
        let parcel = self.store.get(number)?;

        let next = parcel.status.next().ok_or(StateError::IllegalTransition {
            number,
            from: parcel.status,
            to: parcel.status,
        })?;
        self.store.set_status(number, next)?;

        info!(number, from = %parcel.status, to = %next, "advanced parcel status");
        Ok(next)
    }

    /// Change the delivery address of a registered parcel
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> Result<()> {
        self.store.set_address(number, address)?;
        info!(number, address, "changed parcel address");
        Ok(())
    }

    /// Delete a registered parcel
    pub fn delete(&self, number: ParcelNumber) -> Result<()> {
        self.store.delete(number)?;
        info!(number, "deleted parcel");
        Ok(())
    }
}
