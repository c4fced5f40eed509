//! The event loop owning the waypoint list.
//!
//! Every mutation, live fix, storage completion and query completion arrives
//! as an [`Event`] on one queue and is handled to completion before the next
//! one. Asynchronous work (loading, subscribing, route queries, one-shot
//! position requests) runs on spawned tasks that post their outcome back onto
//! the queue.

use std::sync::Arc;

use geo::Coord;
use rota_core::geolocation::{
    FixCallback, GeolocationError, GeolocationStream, PositionFix, Subscription,
};
use rota_core::sync::{RouteSync, SyncCommand, SyncState};
use rota_core::{
    InitialClaim, Mutation, PersistedState, PersistedStateStore, RouteError, RouteGeometry,
    RouteQueryClient, Waypoint, WaypointList, WaypointReconciler,
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::error::{Notice, SessionError};
use crate::persist::{self, PersistWorker};

/// Reply channel for requests that report completion.
pub(crate) type Reply<T> = oneshot::Sender<T>;

/// Everything the event loop reacts to.
pub(crate) enum Event {
    Hydrated(Option<PersistedState>),
    Subscribed(Result<Subscription, GeolocationError>),
    Fix(PositionFix),
    Append(Waypoint),
    Remove(usize),
    Recenter(Coord),
    RecenterFromDevice(Reply<Result<(), SessionError>>),
    DevicePosition {
        result: Result<PositionFix, GeolocationError>,
        reply: Reply<Result<(), SessionError>>,
    },
    SetSearchText(String),
    QueryDone {
        seq: u64,
        result: Result<RouteGeometry, RouteError>,
    },
    WhenStarted(Reply<()>),
    WhenIdle(Reply<()>),
    Shutdown,
}

/// External collaborators of a session.
#[derive(Clone)]
pub struct Collaborators {
    /// Routing provider.
    pub router: Arc<dyn RouteQueryClient>,
    /// Device position source.
    pub geolocation: Arc<dyn GeolocationStream>,
    /// Durable state storage.
    pub store: Arc<dyn PersistedStateStore>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Channels the event loop publishes state through.
pub(crate) struct Outputs {
    pub(crate) waypoints: watch::Sender<WaypointList>,
    pub(crate) geometry: watch::Sender<RouteGeometry>,
    pub(crate) search_text: watch::Sender<String>,
    pub(crate) notices: broadcast::Sender<Notice>,
}

/// Virtual-time aware clock reading for the sync machine.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

pub(crate) struct Actor {
    config: SessionConfig,
    collaborators: Collaborators,
    events: mpsc::UnboundedReceiver<Event>,
    self_tx: mpsc::WeakUnboundedSender<Event>,
    outputs: Outputs,
    reconciler: WaypointReconciler,
    sync: RouteSync,
    search_text: String,
    seen_fix: bool,
    subscription: Option<Subscription>,
    persist: PersistWorker,
    startup_pending: u8,
    started_waiters: Vec<Reply<()>>,
    idle_waiters: Vec<Reply<()>>,
}

impl Actor {
    pub(crate) fn new(
        config: SessionConfig,
        collaborators: Collaborators,
        events: mpsc::UnboundedReceiver<Event>,
        self_tx: mpsc::WeakUnboundedSender<Event>,
        outputs: Outputs,
    ) -> Self {
        let persist = PersistWorker::spawn(Arc::clone(&collaborators.store));
        let sync = RouteSync::new(config.sync);
        Self {
            config,
            collaborators,
            events,
            self_tx,
            outputs,
            reconciler: WaypointReconciler::new(),
            sync,
            search_text: String::new(),
            seen_fix: false,
            subscription: None,
            persist,
            startup_pending: 2,
            started_waiters: Vec::new(),
            idle_waiters: Vec::new(),
        }
    }

    pub(crate) async fn run(mut self) {
        self.start_hydration();
        self.start_subscription();
        loop {
            let deadline = self.sync.next_deadline();
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(Event::Shutdown) | None => break,
                    Some(event) => self.handle(event),
                },
                () = sleep_until(deadline) => {
                    let command = self.sync.on_deadline(now());
                    self.execute(command);
                }
            }
            self.wake_idle_waiters();
        }
        self.finish().await;
    }

    /// Post `event` from a spawned task. Fails silently once the loop ended.
    fn poster(&self) -> impl Fn(Event) + Send + Sync + 'static {
        let weak = self.self_tx.clone();
        move |event| {
            if let Some(tx) = weak.upgrade() {
                // A closed queue means the session is shutting down.
                drop(tx.send(event));
            }
        }
    }

    fn start_hydration(&self) {
        let store = Arc::clone(&self.collaborators.store);
        let post = self.poster();
        tokio::spawn(async move {
            post(Event::Hydrated(persist::load(store).await));
        });
    }

    fn start_subscription(&self) {
        let geolocation = Arc::clone(&self.collaborators.geolocation);
        let options = self.config.watch;
        let post_fix = self.poster();
        let on_fix: FixCallback = Box::new(move |fix| post_fix(Event::Fix(fix)));
        let post = self.poster();
        tokio::spawn(async move {
            post(Event::Subscribed(geolocation.subscribe(options, on_fix).await));
        });
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Hydrated(state) => {
                self.on_hydrated(state);
                self.startup_step_done();
            }
            Event::Subscribed(result) => {
                self.on_subscribed(result);
                self.startup_step_done();
            }
            Event::Fix(fix) => self.on_fix(fix),
            Event::Append(waypoint) => {
                let mutation = self.reconciler.append(waypoint);
                self.after_mutation(mutation);
            }
            Event::Remove(index) => self.on_remove(index),
            Event::Recenter(location) => {
                let mutation = self.reconciler.recenter_on_user(location);
                self.after_mutation(mutation);
            }
            Event::RecenterFromDevice(reply) => self.request_device_position(reply),
            Event::DevicePosition { result, reply } => self.on_device_position(result, reply),
            Event::SetSearchText(text) => self.on_search_text(text),
            Event::QueryDone { seq, result } => {
                let command = self.sync.on_query_result(seq, result, now());
                self.execute(command);
            }
            Event::WhenStarted(reply) => {
                if self.startup_pending == 0 {
                    if reply.send(()).is_err() {
                        log::trace!("startup waiter went away");
                    }
                } else {
                    self.started_waiters.push(reply);
                }
            }
            Event::WhenIdle(reply) => self.idle_waiters.push(reply),
            // Handled by the loop.
            Event::Shutdown => {}
        }
    }

    fn startup_step_done(&mut self) {
        self.startup_pending = self.startup_pending.saturating_sub(1);
        if self.startup_pending == 0 {
            for waiter in self.started_waiters.drain(..) {
                if waiter.send(()).is_err() {
                    log::trace!("startup waiter went away");
                }
            }
        }
    }

    fn on_hydrated(&mut self, state: Option<PersistedState>) {
        let Some(state) = state else {
            log::debug!("no saved route state");
            return;
        };
        let search_text = state.last_search_text.clone();
        let mutation = self.reconciler.hydrate(state);
        if self.reconciler.claim() != Some(InitialClaim::Hydrated) {
            return;
        }
        log::info!(
            "restored {} saved waypoints",
            self.reconciler.waypoints().len()
        );
        self.search_text = search_text;
        self.outputs.search_text.send_replace(self.search_text.clone());
        if mutation.is_changed() {
            self.publish_list_change();
        }
    }

    fn on_subscribed(&mut self, result: Result<Subscription, GeolocationError>) {
        match result {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(GeolocationError::PermissionDenied) => {
                log::info!("location permission denied; live origin disabled");
                self.notify(Notice::LocationPermissionDenied);
            }
            Err(err) => log::warn!("position watch failed: {err}"),
        }
    }

    fn on_fix(&mut self, fix: PositionFix) {
        let location = fix.location();
        let mut mutation = Mutation::Unchanged;
        if !self.seen_fix {
            self.seen_fix = true;
            mutation = self.reconciler.seed_from_live_fix(location);
        }
        if !mutation.is_changed() {
            mutation = self.reconciler.apply_live_fix(location);
        }
        self.after_mutation(mutation);
    }

    fn on_remove(&mut self, index: usize) {
        match self.reconciler.remove(index) {
            Ok(mutation) => self.after_mutation(mutation),
            Err(err) => {
                log::error!("rejected waypoint removal: {err}");
                debug_assert!(false, "rejected waypoint removal: {err}");
            }
        }
    }

    fn request_device_position(&self, reply: Reply<Result<(), SessionError>>) {
        let geolocation = Arc::clone(&self.collaborators.geolocation);
        let post = self.poster();
        tokio::spawn(async move {
            let result = geolocation.current_position().await;
            post(Event::DevicePosition { result, reply });
        });
    }

    fn on_device_position(
        &mut self,
        result: Result<PositionFix, GeolocationError>,
        reply: Reply<Result<(), SessionError>>,
    ) {
        let outcome = match result {
            Ok(fix) => {
                let mutation = self.reconciler.recenter_on_user(fix.location());
                self.after_mutation(mutation);
                Ok(())
            }
            Err(err) => {
                if err == GeolocationError::PermissionDenied {
                    self.notify(Notice::LocationPermissionDenied);
                }
                log::warn!("cannot recenter on device position: {err}");
                Err(SessionError::Location(err))
            }
        };
        drop(reply.send(outcome));
    }

    fn on_search_text(&mut self, text: String) {
        if text == self.search_text {
            return;
        }
        self.search_text = text;
        self.outputs.search_text.send_replace(self.search_text.clone());
        self.persist.save(self.snapshot());
    }

    fn after_mutation(&mut self, mutation: Mutation) {
        if mutation.is_changed() {
            self.publish_list_change();
            self.persist.save(self.snapshot());
        }
    }

    fn publish_list_change(&mut self) {
        let waypoints = self.reconciler.waypoints().clone();
        let command = self.sync.notify_change(&waypoints, now());
        self.outputs.waypoints.send_replace(waypoints);
        self.execute(command);
    }

    fn snapshot(&self) -> PersistedState {
        PersistedState {
            waypoints: self.reconciler.waypoints().clone(),
            last_search_text: self.search_text.clone(),
        }
    }

    fn execute(&self, command: Option<SyncCommand>) {
        match command {
            Some(SyncCommand::Query(ticket)) => {
                log::debug!(
                    "starting route query {} through {} points",
                    ticket.seq,
                    ticket.coordinates.len()
                );
                let router = Arc::clone(&self.collaborators.router);
                let vehicle = self.config.vehicle.clone();
                let post = self.poster();
                tokio::spawn(async move {
                    let result = router.compute_route(&ticket.coordinates, &vehicle).await;
                    post(Event::QueryDone {
                        seq: ticket.seq,
                        result,
                    });
                });
            }
            Some(SyncCommand::Publish { geometry, error }) => {
                self.outputs.geometry.send_replace(geometry);
                if let Some(error) = error {
                    self.notify(Notice::RouteFailed(error));
                }
            }
            None => {}
        }
    }

    fn notify(&self, notice: Notice) {
        // No listeners is fine; notices are fire-and-forget.
        drop(self.outputs.notices.send(notice));
    }

    fn wake_idle_waiters(&mut self) {
        if self.sync.state() == SyncState::Idle {
            for waiter in self.idle_waiters.drain(..) {
                if waiter.send(()).is_err() {
                    log::trace!("idle waiter went away");
                }
            }
        }
    }

    async fn finish(mut self) {
        if let Some(subscription) = self.subscription.take() {
            log::debug!("cancelling position watch");
            subscription.cancel();
        }
        // Later startup replies find the queue closed and drop their payloads,
        // which cancels a late subscription.
        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            drop(event);
        }
        self.persist.flush().await;
        log::debug!("route session stopped");
    }
}
