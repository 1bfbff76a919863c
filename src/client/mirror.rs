//! Local mirror of the server's destinations and users.
//!
//! Every mutation waits for the server to confirm it and only then patches
//! the local arrays (insert, replace or remove by id). A failed request
//! leaves them untouched and hands the error back. Two mutations in flight
//! on the same record race, and whichever response lands last wins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use mongodb::bson::oid::ObjectId;

use crate::client::api::{ClientError, TravelApi};
use crate::models::destination::{Destination, DestinationPatch, NewDestination, UserStats};
use crate::models::object_id::parse_object_id;
use crate::models::user::{LoginRequest, ProfileUpdate, RegisterRequest, UserProfile, UserRole};
use crate::services::query::{self, DestinationFilter, SortKey, StatusFilter};

#[derive(Debug, Clone, Default)]
pub struct MirrorState {
    pub destinations: Vec<Destination>,
    pub users: Vec<UserProfile>,
    pub session: Option<UserProfile>,
    pub filter: DestinationFilter,
}

/// Marks one request as in flight for as long as it lives.
struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Pending(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MirrorStore<A> {
    api: A,
    state: Mutex<MirrorState>,
    in_flight: AtomicUsize,
}

fn replace_by_id(destinations: &mut [Destination], updated: &Destination) {
    if let Some(slot) = destinations.iter_mut().find(|d| d.id == updated.id) {
        *slot = updated.clone();
    }
}

impl<A: TravelApi> MirrorStore<A> {
    pub fn new(api: A) -> Self {
        MirrorStore {
            api,
            state: Mutex::new(MirrorState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // Never held across an await.
    fn lock(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> MirrorState {
        self.lock().clone()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.lock().destinations.clone()
    }

    pub fn users(&self) -> Vec<UserProfile> {
        self.lock().users.clone()
    }

    pub fn session(&self) -> Option<UserProfile> {
        self.lock().session.clone()
    }

    pub fn filter(&self) -> DestinationFilter {
        self.lock().filter.clone()
    }

    /// Whether any request is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn caller(&self) -> Result<ObjectId, ClientError> {
        self.lock()
            .session
            .as_ref()
            .map(|user| user.id)
            .ok_or(ClientError::NotLoggedIn)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = {
            let _pending = Pending::start(&self.in_flight);
            self.api.login(&request).await?
        };
        self.lock().session = Some(user.clone());
        Ok(user)
    }

    /// Registers and signs in as the new account.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, ClientError> {
        let user = {
            let _pending = Pending::start(&self.in_flight);
            self.api.register(&request).await?
        };
        self.lock().session = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&self) {
        let mut state = self.lock();
        state.session = None;
        state.destinations.clear();
    }

    pub async fn fetch_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        let users = {
            let _pending = Pending::start(&self.in_flight);
            self.api.list_users().await?
        };
        self.lock().users = users.clone();
        Ok(users)
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<(), ClientError> {
        let caller = self.caller()?;
        {
            let _pending = Pending::start(&self.in_flight);
            self.api.delete_user(&caller, id).await?;
        }
        let mut state = self.lock();
        state.users.retain(|u| u.id != *id);
        if state.session.as_ref().map(|u| u.id) == Some(*id) {
            state.session = None;
        }
        Ok(())
    }

    /// Deletes the signed-in account and ends the session.
    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let me = self.caller()?;
        self.delete_user(&me).await?;
        self.lock().destinations.clear();
        Ok(())
    }

    /// Updates the signed-in user's profile.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, ClientError> {
        let me = self.caller()?;
        let user = {
            let _pending = Pending::start(&self.in_flight);
            self.api.update_profile(&me, &me, &update).await?
        };

        let mut state = self.lock();
        state.session = Some(user.clone());
        if let Some(slot) = state.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(user)
    }

    /// Loads destinations for the current filter. Admins get everything;
    /// users only what they own. Without a session the list is emptied.
    pub async fn fetch_destinations(&self) -> Result<Vec<Destination>, ClientError> {
        let (session, filter) = {
            let state = self.lock();
            (state.session.clone(), state.filter.clone())
        };
        let Some(user) = session else {
            debug!("no session, clearing destinations");
            self.lock().destinations.clear();
            return Ok(Vec::new());
        };

        let filter = DestinationFilter {
            owner_id: (user.role != UserRole::Admin).then_some(user.id),
            ..filter
        };
        let destinations = {
            let _pending = Pending::start(&self.in_flight);
            self.api.list_destinations(&filter).await?
        };
        self.lock().destinations = destinations.clone();
        Ok(destinations)
    }

    pub async fn add_destination(&self, input: NewDestination) -> Result<Destination, ClientError> {
        let caller = self.caller()?;
        let created = {
            let _pending = Pending::start(&self.in_flight);
            self.api.create_destination(&caller, &input).await?
        };
        self.lock().destinations.insert(0, created.clone());
        Ok(created)
    }

    /// Malformed ids are rejected without a request.
    pub async fn update_destination(
        &self,
        id: &str,
        patch: DestinationPatch,
    ) -> Result<Destination, ClientError> {
        let id = parse_object_id(id).map_err(|_| ClientError::InvalidId)?;
        let caller = self.caller()?;
        let updated = {
            let _pending = Pending::start(&self.in_flight);
            self.api.update_destination(&caller, &id, &patch).await?
        };
        replace_by_id(&mut self.lock().destinations, &updated);
        Ok(updated)
    }

    pub async fn delete_destination(&self, id: &ObjectId) -> Result<(), ClientError> {
        let caller = self.caller()?;
        {
            let _pending = Pending::start(&self.in_flight);
            self.api.delete_destination(&caller, id).await?;
        }
        self.lock().destinations.retain(|d| d.id != *id);
        Ok(())
    }

    pub async fn toggle_featured(&self, id: &ObjectId) -> Result<Destination, ClientError> {
        let caller = self.caller()?;
        let updated = {
            let _pending = Pending::start(&self.in_flight);
            self.api.toggle_featured(&caller, id).await?
        };
        replace_by_id(&mut self.lock().destinations, &updated);
        Ok(updated)
    }

    /// Admin removal from the moderation list. Like every other mutation it
    /// only touches local state once the server has confirmed.
    pub async fn delete_destination_by_admin(&self, id: &ObjectId) -> Result<(), ClientError> {
        self.delete_destination(id).await
    }

    pub async fn copy_admin_destination(&self, id: &ObjectId) -> Result<Destination, ClientError> {
        let caller = self.caller()?;
        let copy = {
            let _pending = Pending::start(&self.in_flight);
            self.api.copy_destination(&caller, id).await?
        };
        self.lock().destinations.insert(0, copy.clone());
        Ok(copy)
    }

    pub async fn user_stats(&self, owner: &ObjectId) -> Result<UserStats, ClientError> {
        let _pending = Pending::start(&self.in_flight);
        self.api.user_stats(owner).await
    }

    pub fn set_search(&self, search: &str) {
        self.lock().filter.search = (!search.is_empty()).then(|| search.to_string());
    }

    /// `all`, `to-visit` or `visited`.
    pub fn set_status(&self, status: &str) {
        self.lock().filter.status = StatusFilter::parse(status);
    }

    pub fn set_country(&self, country: &str) {
        self.lock().filter.country = (!country.is_empty()).then(|| country.to_string());
    }

    /// `newest`, `oldest` or `alphabetical`.
    pub fn set_sort(&self, sort: &str) {
        self.lock().filter.sort = SortKey::parse(sort);
    }

    /// The local list as `viewer` sees it under the current filter. `None`
    /// is the admin view.
    pub fn filtered_destinations(&self, viewer: Option<&ObjectId>) -> Vec<Destination> {
        let state = self.lock();
        query::project(&state.destinations, &state.filter, viewer)
    }

    pub fn destinations_for_user(&self, user: &ObjectId) -> Vec<Destination> {
        query::board_for_user(&self.lock().destinations, user)
    }
}
