//! Parcel store: CRUD and status rules over the `parcel` table
//!
//! The store borrows a connection owned by the caller. Every mutation is a
//! single guarded statement, so the status check and the write happen
//! atomically; when the guard rejects the write the store reads the row once
//! more to tell a missing parcel apart from one in the wrong status.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{ParcelError, Result, StateError};
use crate::parcel::{validate_address, ClientId, Parcel, ParcelNumber, ParcelStatus};

const SELECT_COLUMNS: &str = "SELECT number, client, status, address, created_at FROM parcel";

/// Store for parcel records
pub struct ParcelStore<'a> {
    conn: &'a Connection,
}

impl<'a> ParcelStore<'a> {
    /// Create a store over an open connection with the parcel schema in place
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a parcel and return its assigned number.
    ///
    /// The stored status is always `Registered`, whatever the caller set.
    pub fn add(&self, parcel: &Parcel) -> Result<ParcelNumber> {
        parcel.validate()?;

        if parcel.status != ParcelStatus::Registered {
            debug!(
                client = parcel.client,
                status = %parcel.status,
                "ignoring caller status, new parcels start registered"
            );
        }

        let number: ParcelNumber = self.conn.query_row(
            "INSERT INTO parcel (client, status, address, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING number",
            params![
                parcel.client,
                ParcelStatus::Registered,
                parcel.address,
                parcel.created_at,
            ],
            |row| row.get(0),
        )?;

        debug!(number, client = parcel.client, "added parcel");
        Ok(number)
    }

    /// Get a parcel by number
    pub fn get(&self, number: ParcelNumber) -> Result<Parcel> {
        self.conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE number = ?1"),
                [number],
                Self::row_to_parcel,
            )
            .optional()?
            .ok_or(ParcelError::NotFound(number))
    }

    /// Get all parcels of a client, ordered by number
    pub fn get_by_client(&self, client: ClientId) -> Result<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE client = ?1 ORDER BY number"))?;

        let parcels = stmt
            .query_map([client], Self::row_to_parcel)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(client, count = parcels.len(), "loaded client parcels");
        Ok(parcels)
    }

    /// Replace the address of a registered parcel
    pub fn set_address(&self, number: ParcelNumber, address: &str) -> Result<()> {
        validate_address(address)?;

        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3",
            params![address, number, ParcelStatus::Registered],
        )?;

        if changed == 0 {
            let status = self.current_status(number)?;
            warn!(number, %status, "rejected address change");
            return Err(StateError::AddressFrozen { number, status }.into());
        }

        debug!(number, "updated parcel address");
        Ok(())
    }

    /// Move a parcel one step forward in its lifecycle
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> Result<()> {
        let Some(required) = status.previous() else {
            let from = self.current_status(number)?;
            warn!(number, %from, to = %status, "rejected status change");
            return Err(StateError::IllegalTransition {
                number,
                from,
                to: status,
            }
            .into());
        };

        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2 AND status = ?3",
            params![status, number, required],
        )?;

        if changed == 0 {
            let from = self.current_status(number)?;
            warn!(number, %from, to = %status, "rejected status change");
            return Err(StateError::IllegalTransition {
                number,
                from,
                to: status,
            }
            .into());
        }

        debug!(number, %status, "updated parcel status");
        Ok(())
    }

    /// Delete a registered parcel
    pub fn delete(&self, number: ParcelNumber) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = ?1 AND status = ?2",
            params![number, ParcelStatus::Registered],
        )?;

        if changed == 0 {
            let status = self.current_status(number)?;
            warn!(number, %status, "rejected parcel deletion");
            return Err(StateError::NotDeletable { number, status }.into());
        }

        debug!(number, "deleted parcel");
        Ok(())
    }

    fn current_status(&self, number: ParcelNumber) -> Result<ParcelStatus> {
        self.conn
            .query_row(
                "SELECT status FROM parcel WHERE number = ?1",
                [number],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(ParcelError::NotFound(number))
    }

    fn row_to_parcel(row: &rusqlite::Row) -> rusqlite::Result<Parcel> {
        Ok(Parcel {
            number: row.get(0)?,
            client: row.get(1)?,
            status: row.get(2)?,
            address: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        Schema::initialize(&conn).unwrap();
        conn
    }

    fn test_parcel() -> Parcel {
        Parcel::new(1000, "test", "2024-03-01T10:00:00Z")
    }

    #[test]
    fn test_add_get_delete() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let parcel = test_parcel();

        let number = store.add(&parcel).unwrap();
        assert!(number > 0);

        let stored = store.get(number).unwrap();
        assert_eq!(stored.number, number);
        assert_eq!(stored.client, parcel.client);
        assert_eq!(stored.status, ParcelStatus::Registered);
        assert_eq!(stored.address, parcel.address);
        assert_eq!(stored.created_at, parcel.created_at);

        store.delete(number).unwrap();
        assert!(matches!(store.get(number), Err(ParcelError::NotFound(n)) if n == number));
    }

    #[test]
    fn test_add_forces_registered() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let mut parcel = test_parcel();
        parcel.status = ParcelStatus::Delivered;

        let number = store.add(&parcel).unwrap();
        assert_eq!(store.get(number).unwrap().status, ParcelStatus::Registered);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let conn = setup();
        let store = ParcelStore::new(&conn);

        let mut parcel = test_parcel();
        parcel.address = String::new();
        assert!(matches!(store.add(&parcel), Err(ParcelError::Validation(_))));

        let mut parcel = test_parcel();
        parcel.created_at = String::new();
        assert!(matches!(store.add(&parcel), Err(ParcelError::Validation(_))));

        assert!(store.get_by_client(1000).unwrap().is_empty());
    }

    #[test]
    fn test_set_address() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();

        store.set_address(number, "new test address").unwrap();

        let stored = store.get(number).unwrap();
        assert_eq!(stored.address, "new test address");
        assert_eq!(stored.status, ParcelStatus::Registered);
        assert_eq!(stored.client, 1000);
    }

    #[test]
    fn test_set_address_same_value_succeeds() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();

        store.set_address(number, "test").unwrap();
        assert_eq!(store.get(number).unwrap().address, "test");
    }

    #[test]
    fn test_set_address_rejects_empty() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();

        assert!(matches!(
            store.set_address(number, "  "),
            Err(ParcelError::Validation(_))
        ));
        assert_eq!(store.get(number).unwrap().address, "test");
    }

    #[test]
    fn test_set_address_after_sent_is_frozen() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();
        store.set_status(number, ParcelStatus::Sent).unwrap();

        let err = store.set_address(number, "elsewhere").unwrap_err();
        assert!(matches!(
            err,
            ParcelError::InvalidState(StateError::AddressFrozen {
                status: ParcelStatus::Sent,
                ..
            })
        ));
        assert_eq!(store.get(number).unwrap().address, "test");
    }

    #[test]
    fn test_set_status_forward() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();

        store.set_status(number, ParcelStatus::Sent).unwrap();
        assert_eq!(store.get(number).unwrap().status, ParcelStatus::Sent);

        store.set_status(number, ParcelStatus::Delivered).unwrap();
        assert_eq!(store.get(number).unwrap().status, ParcelStatus::Delivered);
    }

    #[test]
    fn test_set_status_cannot_skip_sent() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();

        let err = store
            .set_status(number, ParcelStatus::Delivered)
            .unwrap_err();
        match err {
            ParcelError::InvalidState(StateError::IllegalTransition { from, to, .. }) => {
                assert_eq!(from, ParcelStatus::Registered);
                assert_eq!(to, ParcelStatus::Delivered);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.get(number).unwrap().status, ParcelStatus::Registered);
    }

    #[test]
    fn test_missing_parcel_is_not_found() {
        let conn = setup();
        let store = ParcelStore::new(&conn);

        assert!(store.get(42).unwrap_err().is_not_found());
        assert!(store.set_address(42, "x").unwrap_err().is_not_found());
        assert!(store
            .set_status(42, ParcelStatus::Sent)
            .unwrap_err()
            .is_not_found());
        assert!(store
            .set_status(42, ParcelStatus::Registered)
            .unwrap_err()
            .is_not_found());
        assert!(store.delete(42).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_sent_parcel_fails() {
        let conn = setup();
        let store = ParcelStore::new(&conn);
        let number = store.add(&test_parcel()).unwrap();
        store.set_status(number, ParcelStatus::Sent).unwrap();
        let before = store.get(number).unwrap();

        let err = store.delete(number).unwrap_err();
        assert!(matches!(
            err,
            ParcelError::InvalidState(StateError::NotDeletable { .. })
        ));
        assert_eq!(store.get(number).unwrap(), before);
    }

    #[test]
    fn test_unknown_status_in_storage_is_storage_error() {
        let conn = setup();
        conn.execute(
            "INSERT INTO parcel (client, status, address, created_at) VALUES (1, 'lost', 'x', '2024-03-01T10:00:00Z')",
            [],
        )
        .unwrap();
        let number = conn.last_insert_rowid();

        let store = ParcelStore::new(&conn);
        assert!(matches!(store.get(number), Err(ParcelError::Storage(_))));
    }
}
