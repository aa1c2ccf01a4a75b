//! Record service: the read-modify-write protocol shared by all operations.
//!
//! Every operation touches the single key named by its ID argument. It reads
//! that key at most once, transforms the decoded entity, and writes it back at
//! most once. The write is always the last step, so any failure leaves the
//! store as it was.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::{Entity, decode, encode};
use crate::domain::{Car, LedgerError, Step, User};
use crate::ports::LedgerStore;

mod options;

pub use options::{LedgerOptions, OverwritePolicy, PointsPolicy};

/// Entity operations over an injected ledger store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use record_ledger::{ErrorCode, LedgerOptions, MemoryLedger, RecordService};
///
/// let service = RecordService::new(Arc::new(MemoryLedger::new()), LedgerOptions::default());
/// service.add_car("car1").expect("add car");
/// service.add_car_record("car1", "oil change").expect("add record");
///
/// assert_eq!(service.get_car("car1").expect("get car").records(), ["oil change"]);
///
/// let missing = service.add_car_record("missing", "x").expect_err("no such car");
/// assert_eq!(missing.code(), ErrorCode::NotFound);
/// ```
#[derive(Clone)]
pub struct RecordService<S> {
    store: Arc<S>,
    options: LedgerOptions,
}

impl<S> RecordService<S> {
    /// Create a service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, options: LedgerOptions) -> Self {
        Self { store, options }
    }

    /// Options applied to every operation.
    #[must_use]
    pub const fn options(&self) -> LedgerOptions {
        self.options
    }

    /// The injected store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S> RecordService<S>
where
    S: LedgerStore,
{
    /// Register `car_id` with no service records.
    ///
    /// Under [`OverwritePolicy::Overwrite`] any value already stored under the
    /// key is replaced, discarding its records.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyExists`] under [`OverwritePolicy::Guard`]
    /// when the key holds a value, or a store/encode failure.
    pub fn add_car(&self, car_id: &str) -> Result<(), LedgerError> {
        self.ensure_vacant::<Car>(car_id)?;
        self.write(car_id, &Car::register(car_id))
    }

    /// Fetch the car stored under `car_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the key is empty and
    /// [`LedgerError::Decode`] when it holds something other than a car.
    pub fn get_car(&self, car_id: &str) -> Result<Car, LedgerError> {
        self.require(car_id)
    }

    /// Append `record` to the service history of `car_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the car is not registered, or a
    /// store/codec failure.
    pub fn add_car_record(&self, car_id: &str, record: &str) -> Result<(), LedgerError> {
        let mut car: Car = self.require(car_id)?;
        if car.car_id() != car_id {
            warn!(key = car_id, stored = car.car_id(), "stored car id differs from its key");
        }
        car.append_record(record);
        self.write(car_id, &car)
    }

    /// Create user `user_id` named `name` with a zero balance.
    ///
    /// Under [`OverwritePolicy::Overwrite`] any value already stored under the
    /// key is replaced, resetting its balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyExists`] under [`OverwritePolicy::Guard`]
    /// when the key holds a value, or a store/encode failure.
    pub fn create_user(&self, user_id: &str, name: &str) -> Result<(), LedgerError> {
        self.ensure_vacant::<User>(user_id)?;
        self.write(user_id, &User::new(name))
    }

    /// Fetch the user stored under `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the key is empty and
    /// [`LedgerError::Decode`] when it holds something other than a user.
    pub fn get_user(&self, user_id: &str) -> Result<User, LedgerError> {
        self.require(user_id)
    }

    /// Credit `points` to `user_id`.
    ///
    /// An absent user is created with `user_id` as its name and `points` as
    /// its balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPoints`] for negative points under
    /// [`PointsPolicy::Strict`], [`LedgerError::BalanceOverflow`] when the
    /// sum does not fit, or a store/codec failure.
    pub fn receive_points(&self, user_id: &str, points: i64) -> Result<(), LedgerError> {
        self.check_points(points)?;
        let user = match self.read::<User>(user_id)? {
            Some(mut user) => {
                user.receive(points)
                    .map_err(|err| LedgerError::balance(user_id, err))?;
                user
            }
            None => User::with_balance(user_id, points),
        };
        self.write(user_id, &user)
    }

    /// Debit `points` from `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when the user does not exist,
    /// [`LedgerError::InsufficientBalance`] when the balance is below
    /// `points`, [`LedgerError::InvalidPoints`] for negative points under
    /// [`PointsPolicy::Strict`], or a store/codec failure.
    pub fn pay_points(&self, user_id: &str, points: i64) -> Result<(), LedgerError> {
        self.check_points(points)?;
        let mut user: User = self.require(user_id)?;
        user.pay(points)
            .map_err(|err| LedgerError::balance(user_id, err))?;
        self.write(user_id, &user)
    }

    fn check_points(&self, points: i64) -> Result<(), LedgerError> {
        if self.options.points == PointsPolicy::Strict && points < 0 {
            return Err(LedgerError::InvalidPoints { points });
        }
        Ok(())
    }

    fn ensure_vacant<E: Entity>(&self, key: &str) -> Result<(), LedgerError> {
        if self.options.overwrite == OverwritePolicy::Overwrite {
            return Ok(());
        }
        if self.fetch::<E>(key)?.is_some() {
            return Err(LedgerError::AlreadyExists {
                kind: E::KIND,
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn fetch<E: Entity>(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let bytes = self.store.get(key).map_err(|source| LedgerError::Store {
            step: Step::Get,
            kind: E::KIND,
            key: key.to_owned(),
            source,
        })?;
        debug!(key, kind = %E::KIND, found = bytes.is_some(), "ledger read");
        Ok(bytes)
    }

    fn read<E: Entity>(&self, key: &str) -> Result<Option<E>, LedgerError> {
        self.fetch::<E>(key)?
            .map(|bytes| decode(&bytes).map_err(|err| LedgerError::codec(key, err)))
            .transpose()
    }

    fn require<E: Entity>(&self, key: &str) -> Result<E, LedgerError> {
        self.read(key)?.ok_or_else(|| LedgerError::NotFound {
            kind: E::KIND,
            key: key.to_owned(),
        })
    }

    fn write<E: Entity>(&self, key: &str, entity: &E) -> Result<(), LedgerError> {
        let bytes = encode(entity).map_err(|err| LedgerError::codec(key, err))?;
        let size = bytes.len();
        self.store
            .put(key, bytes)
            .map_err(|source| LedgerError::Store {
                step: Step::Put,
                kind: E::KIND,
                key: key.to_owned(),
                source,
            })?;
        debug!(key, kind = %E::KIND, size, "ledger write");
        Ok(())
    }
}
