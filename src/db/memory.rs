//! Almacén en memoria con el mismo contrato que el repositorio MongoDB.
//! Solo se compila en tests: permite ejercitar el motor de reservas
//! completo, incluida la carrera de creación concurrente, sin base de
//! datos.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::api::AppResult;
use crate::booking::lifecycle::BookingPatch;
use crate::booking::status::BookingStatus;
use crate::db::current_timestamp;
use crate::db::models::{Booking, Branch, Restaurant, Table, User};
use crate::db::store::ReservationStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
    restaurants: Arc<RwLock<HashMap<ObjectId, Restaurant>>>,
    branches: Arc<RwLock<HashMap<ObjectId, Branch>>>,
    tables: Arc<RwLock<HashMap<ObjectId, Table>>>,
    bookings: Arc<RwLock<HashMap<ObjectId, Booking>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, name: &str, email: &str) -> ObjectId {
        let id = ObjectId::new();
        let user = User {
            id: Some(id),
            name: name.to_string(),
            email: email.to_string(),
            phone: "+34 600 000 000".to_string(),
            hashed_password: "$argon2$fake".to_string(),
            created_at: current_timestamp(),
        };
        self.users.write().await.insert(id, user);
        id
    }

    pub async fn add_restaurant(&self, name: &str) -> ObjectId {
        let id = ObjectId::new();
        let restaurant = Restaurant {
            id: Some(id),
            name: name.to_string(),
            description: None,
            logo: None,
            cuisine_ids: Vec::new(),
            created_at: current_timestamp(),
        };
        self.restaurants.write().await.insert(id, restaurant);
        id
    }

    pub async fn add_branch(&self, restaurant_id: ObjectId, city: &str, address: &str) -> ObjectId {
        let id = ObjectId::new();
        let branch = Branch {
            id: Some(id),
            restaurant_id,
            city: city.to_string(),
            country: "España".to_string(),
            address: address.to_string(),
            location: "40.4168,-3.7038".to_string(),
            created_at: current_timestamp(),
        };
        self.branches.write().await.insert(id, branch);
        id
    }

    pub async fn add_table(
        &self,
        branch_id: ObjectId,
        table_number: i32,
        max_capacity: i32,
    ) -> ObjectId {
        let id = ObjectId::new();
        let table = Table {
            id: Some(id),
            branch_id,
            table_number,
            max_capacity,
            is_side_table: false,
            is_open_space: false,
            floor: 1,
            created_at: current_timestamp(),
        };
        self.tables.write().await.insert(id, table);
        id
    }

    /// Inserta una reserva directamente, sin pasar por el gestor de ciclo
    /// de vida. Para preparar escenarios en tests.
    pub async fn seed_booking(
        &self,
        user_id: ObjectId,
        table_id: ObjectId,
        start_time: i64,
        end_time: i64,
        status: BookingStatus,
    ) -> Booking {
        let id = ObjectId::new();
        let now = current_timestamp();
        let booking = Booking {
            id: Some(id),
            user_id,
            table_id,
            start_time,
            end_time,
            special_requests: None,
            status,
            created_at: now,
            updated_at: now,
        };
        self.bookings.write().await.insert(id, booking.clone());
        booking
    }

    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn get_user(&self, id: ObjectId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_table(&self, id: ObjectId) -> AppResult<Option<Table>> {
        Ok(self.tables.read().await.get(&id).cloned())
    }

    async fn get_branch(&self, id: ObjectId) -> AppResult<Option<Branch>> {
        Ok(self.branches.read().await.get(&id).cloned())
    }

    async fn get_restaurant(&self, id: ObjectId) -> AppResult<Option<Restaurant>> {
        Ok(self.restaurants.read().await.get(&id).cloned())
    }

    async fn tables_in_branch(&self, branch_id: ObjectId) -> AppResult<Vec<Table>> {
        let mut tables: Vec<Table> = self
            .tables
            .read()
            .await
            .values()
            .filter(|t| t.branch_id == branch_id)
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.table_number);
        Ok(tables)
    }

    async fn insert_booking(&self, mut booking: Booking) -> AppResult<Booking> {
        let id = ObjectId::new();
        booking.id = Some(id);
        self.bookings.write().await.insert(id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: ObjectId) -> AppResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn apply_patch(&self, id: ObjectId, patch: &BookingPatch) -> AppResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(start_time) = patch.start_time {
            booking.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            booking.end_time = end_time;
        }
        if let Some(special_requests) = &patch.special_requests {
            booking.special_requests = Some(special_requests.clone());
        }
        if let Some(status) = patch.status {
            booking.status = status;
        }
        booking.updated_at = current_timestamp();

        Ok(Some(booking.clone()))
    }

    async fn delete_booking(&self, id: ObjectId) -> AppResult<bool> {
        Ok(self.bookings.write().await.remove(&id).is_some())
    }

    async fn active_bookings_for_table(
        &self,
        table_id: ObjectId,
        exclude: Option<ObjectId>,
    ) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| {
                b.table_id == table_id
                    && b.status != BookingStatus::Cancelled
                    && match exclude {
                        Some(excluded) => b.id != Some(excluded),
                        None => true,
                    }
            })
            .cloned()
            .collect())
    }

    async fn bookings_for_user(&self, user_id: ObjectId) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn bookings_for_tables(
        &self,
        table_ids: &[ObjectId],
        limit: u64,
        offset: u64,
    ) -> AppResult<(u64, Vec<Booking>)> {
        let wanted: HashSet<ObjectId> = table_ids.iter().copied().collect();
        let mut rows: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| wanted.contains(&b.table_id))
            .cloned()
            .collect();
        rows.sort_by_key(|b| Reverse(b.start_time));

        let total = rows.len() as u64;
        let page = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((total, page))
    }
}
