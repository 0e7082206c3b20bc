//! Per-connection mutable state.
//!
//! A session owns everything one connected player needs: identity, the
//! entity id mapping, the chunks the Bedrock peer holds, open windows,
//! pending forms and the outbound packet queues of both peers. All
//! mutation happens on the session task that drains the mailbox, so no
//! locking appears here.

use crate::{
    error::DisconnectReason,
    forms::Form,
    position::{BlockPosition, ChunkPosition, EntityPosition},
    protocol::{
        bedrock::packets::{self as bedrock, Packet},
        java::play,
    },
};
use ahash::{AHashMap, AHashSet};
use tokio::sync::oneshot;
use uuid::Uuid;

pub type SessionId = u64;

/// The Bedrock runtime id reserved for the player itself.
pub const PLAYER_RUNTIME_ID: u64 = 1;

/// Consecutive saturated sends tolerated before the session is
/// disconnected for backpressure.
const SATURATION_LIMIT: u32 = 64;

/// Pending forms expire after this many ticks (60 seconds).
const FORM_TIMEOUT_TICKS: u64 = 1200;

/// Authentication state machine. `Dead` is a sink.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AwaitingJavaLogin,
    Spawned,
    Disconnecting,
    Dead,
}

/// Player identity established during the Bedrock login.
#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub display_name: String,
    pub uuid: Uuid,
    pub xuid: String,
    /// Decoded skin blob, filled in by the worker pool.
    pub skin: Option<Vec<u8>>,
    pub locale: String,
}

impl Default for PlayerIdentity {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            uuid: Uuid::nil(),
            xuid: String::new(),
            skin: None,
            locale: "en_US".to_owned(),
        }
    }
}

/// One tracked entity, addressable from both id namespaces.
#[derive(Debug, Clone)]
pub struct Entity {
    pub java_id: i32,
    pub runtime_id: u64,
    /// Java entity kind id; `-1` for players.
    pub kind: i32,
    pub position: EntityPosition,
    pub is_player: bool,
}

/// An open inventory window mirrored to the Bedrock peer.
#[derive(Debug, Clone)]
pub struct Window {
    pub id: u8,
    /// Bedrock container kind.
    pub kind: u8,
    pub slot_count: usize,
    /// Last contents sent to the Bedrock peer.
    pub contents: Vec<bedrock::ItemStack>,
}

/// The response payload of a form: the raw JSON value, or `None` when
/// the form was cancelled, timed out or the session died.
pub type FormResponse = Option<serde_json::Value>;

struct PendingForm {
    sender: oneshot::Sender<FormResponse>,
    expires_at_tick: u64,
}

struct ScheduledTask {
    at_tick: u64,
    task: Box<dyn FnOnce(&mut Session) + Send>,
}

pub struct Session {
    id: SessionId,
    state: AuthState,
    pub identity: PlayerIdentity,

    // World view.
    pub dimension: i32,
    pub gamemode: i32,
    pub spawn: BlockPosition,
    pub view_distance: u32,
    /// The player's own Java entity id, known after `JoinGame`.
    pub player_java_id: i32,
    /// Last known player position, in the Java frame.
    pub player_position: EntityPosition,

    entities: EntityRegistry,
    chunks: AHashSet<ChunkPosition>,
    windows: AHashMap<u8, Window>,

    forms: AHashMap<u32, PendingForm>,
    form_id_counter: u32,

    tick: u64,
    scheduled: Vec<ScheduledTask>,

    bedrock_tx: flume::Sender<Packet>,
    java_tx: Option<flume::Sender<play::Serverbound>>,
    saturation: u32,
    disconnect_reason: Option<DisconnectReason>,
}

impl Session {
    pub fn new(id: SessionId, bedrock_tx: flume::Sender<Packet>) -> Self {
        Self {
            id,
            state: AuthState::Unauthenticated,
            identity: PlayerIdentity::default(),
            dimension: 0,
            gamemode: 0,
            spawn: BlockPosition { x: 0, y: 64, z: 0 },
            view_distance: 8,
            player_java_id: 0,
            player_position: EntityPosition::default(),
            entities: EntityRegistry::new(),
            chunks: AHashSet::new(),
            windows: AHashMap::new(),
            forms: AHashMap::new(),
            form_id_counter: 0,
            tick: 0,
            scheduled: Vec::new(),
            bedrock_tx,
            java_tx: None,
            saturation: 0,
            disconnect_reason: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Attaches the Java peer once the outbound connection is up.
    pub fn attach_java(&mut self, java_tx: flume::Sender<play::Serverbound>) {
        self.java_tx = Some(java_tx);
    }

    /// Marks the Bedrock login as complete; the Java login is next.
    pub fn begin_java_login(&mut self) {
        if self.state == AuthState::Unauthenticated {
            self.state = AuthState::AwaitingJavaLogin;
        }
    }

    /// Enters `Spawned`. Returns `false` if the session already spawned
    /// (or is shutting down); the transition happens exactly once.
    pub fn mark_spawned(&mut self) -> bool {
        if self.state == AuthState::AwaitingJavaLogin {
            self.state = AuthState::Spawned;
            true
        } else {
            false
        }
    }

    /// Final transition after outbound drain. `Dead` is a sink state.
    pub fn mark_dead(&mut self) {
        self.state = AuthState::Dead;
    }

    // -----------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------

    /// Registers the player itself under the reserved runtime id.
    pub fn register_player(&mut self, java_id: i32, position: EntityPosition) {
        self.player_java_id = java_id;
        self.player_position = position;
        self.entities.insert(Entity {
            java_id,
            runtime_id: PLAYER_RUNTIME_ID,
            kind: -1,
            position,
            is_player: true,
        });
    }

    /// Registers a remote entity and allocates a fresh Bedrock runtime
    /// id. Runtime ids are never reused within a session.
    pub fn register_entity(
        &mut self,
        java_id: i32,
        kind: i32,
        position: EntityPosition,
        is_player: bool,
    ) -> u64 {
        self.entities.register(java_id, kind, position, is_player)
    }

    pub fn unregister_entity(&mut self, java_id: i32) -> Option<Entity> {
        self.entities.remove_by_java(java_id)
    }

    pub fn get_entity_by_java_id(&self, java_id: i32) -> Option<&Entity> {
        self.entities.by_java(java_id)
    }

    pub fn get_entity_by_bedrock_id(&self, runtime_id: u64) -> Option<&Entity> {
        self.entities.by_runtime(runtime_id)
    }

    pub fn update_entity_position(&mut self, java_id: i32, position: EntityPosition) {
        self.entities.update_position(java_id, position);
    }

    /// Drops every tracked entity except the player. Used on dimension
    /// changes, where the server respawns everything.
    pub fn clear_entities(&mut self) -> Vec<Entity> {
        self.entities.clear_except_player()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -----------------------------------------------------------------
    // Chunks
    // -----------------------------------------------------------------

    /// Records that the Bedrock peer now holds this chunk. Call
    /// together with the chunk send.
    pub fn remember_chunk(&mut self, position: ChunkPosition) {
        self.chunks.insert(position);
    }

    /// Records a chunk unload. Call together with the unload send.
    pub fn forget_chunk(&mut self, position: ChunkPosition) -> bool {
        self.chunks.remove(&position)
    }

    pub fn holds_chunk(&self, position: ChunkPosition) -> bool {
        self.chunks.contains(&position)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn clear_chunks(&mut self) {
        self.chunks.clear();
    }

    // -----------------------------------------------------------------
    // Windows
    // -----------------------------------------------------------------

    pub fn open_window(&mut self, window: Window) {
        self.windows.insert(window.id, window);
    }

    pub fn close_window(&mut self, id: u8) -> Option<Window> {
        self.windows.remove(&id)
    }

    pub fn window_mut(&mut self, id: u8) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    // -----------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------

    /// The strictly increasing form id counter.
    pub fn next_form_id(&mut self) -> u32 {
        self.form_id_counter += 1;
        self.form_id_counter
    }

    /// Installs a single-shot response slot for a form id.
    pub fn put_pending_form(&mut self, form_id: u32) -> oneshot::Receiver<FormResponse> {
        let (sender, receiver) = oneshot::channel();
        self.forms.insert(
            form_id,
            PendingForm {
                sender,
                expires_at_tick: self.tick + FORM_TIMEOUT_TICKS,
            },
        );
        receiver
    }

    /// Completes a pending form. Returns `false` for unknown or
    /// already-completed ids; such responses are dropped.
    pub fn complete_form(&mut self, form_id: u32, response: FormResponse) -> bool {
        match self.forms.remove(&form_id) {
            Some(pending) => {
                pending.sender.send(response).ok();
                true
            }
            None => false,
        }
    }

    /// Serializes and sends a form to the Bedrock peer, returning the
    /// receiver that resolves with the response.
    pub fn send_form(&mut self, form: &Form) -> oneshot::Receiver<FormResponse> {
        let form_id = self.next_form_id();
        let receiver = self.put_pending_form(form_id);
        self.send_bedrock(Packet::ModalFormRequest(bedrock::ModalFormRequest {
            form_id,
            form_data: form.serialize().to_string(),
        }));
        receiver
    }

    pub fn pending_form_count(&self) -> usize {
        self.forms.len()
    }

    // -----------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------

    /// Runs a task after `delay_ticks` ticks, on the session task.
    pub fn schedule(
        &mut self,
        delay_ticks: u64,
        task: impl FnOnce(&mut Session) + Send + 'static,
    ) {
        self.scheduled.push(ScheduledTask {
            at_tick: self.tick + delay_ticks.max(1),
            task: Box::new(task),
        });
    }

    /// One 50 ms tick: expires forms and runs due scheduled tasks.
    pub fn handle_tick(&mut self) {
        self.tick += 1;
        let now = self.tick;

        let expired: Vec<u32> = self
            .forms
            .iter()
            .filter(|(_, form)| form.expires_at_tick <= now)
            .map(|(&id, _)| id)
            .collect();
        for id in expired {
            if let Some(form) = self.forms.remove(&id) {
                tracing::debug!(session = self.id, form = id, "form timed out");
                form.sender.send(None).ok();
            }
        }

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].at_tick <= now {
                due.push(self.scheduled.swap_remove(index));
            } else {
                index += 1;
            }
        }
        for entry in due {
            (entry.task)(self);
        }
    }

    // -----------------------------------------------------------------
    // Emission and teardown
    // -----------------------------------------------------------------

    /// Queues a packet for the Bedrock peer. Drops silently once the
    /// session is going down; repeated saturation ends the session.
    pub fn send_bedrock(&mut self, packet: Packet) {
        if matches!(self.state, AuthState::Disconnecting | AuthState::Dead) {
            return;
        }
        match self.bedrock_tx.try_send(packet) {
            Ok(()) => self.saturation = 0,
            Err(flume::TrySendError::Full(_)) => self.note_saturation(),
            Err(flume::TrySendError::Disconnected(_)) => {
                self.disconnect(DisconnectReason::TransportClosed);
            }
        }
    }

    /// Queues a packet for the Java peer.
    pub fn send_java(&mut self, packet: play::Serverbound) {
        if matches!(self.state, AuthState::Disconnecting | AuthState::Dead) {
            return;
        }
        let Some(java_tx) = &self.java_tx else {
            tracing::debug!(session = self.id, "dropping Java send before connection");
            return;
        };
        match java_tx.try_send(packet) {
            Ok(()) => self.saturation = 0,
            Err(flume::TrySendError::Full(_)) => self.note_saturation(),
            Err(flume::TrySendError::Disconnected(_)) => {
                self.disconnect(DisconnectReason::TransportClosed);
            }
        }
    }

    fn note_saturation(&mut self) {
        self.saturation += 1;
        if self.saturation >= SATURATION_LIMIT {
            self.disconnect(DisconnectReason::Backpressure);
        }
    }

    /// Requests teardown. Idempotent: the first reason wins, and
    /// exactly one disconnect frame goes to the Bedrock peer. The
    /// pipeline drains the outbound queues and closes the transports.
    pub fn disconnect(&mut self, reason: DisconnectReason) {
        if matches!(self.state, AuthState::Disconnecting | AuthState::Dead) {
            return;
        }
        tracing::info!(session = self.id, %reason, "session disconnecting");
        self.state = AuthState::Disconnecting;

        // Cancel pending forms with the cancellation sentinel.
        for (_, pending) in self.forms.drain() {
            pending.sender.send(None).ok();
        }

        self.bedrock_tx
            .try_send(Packet::Disconnect(bedrock::Disconnect {
                hide_disconnect_screen: false,
                message: reason.to_string(),
            }))
            .ok();
        self.java_tx = None;
        self.disconnect_reason = Some(reason);
    }

    pub fn disconnect_reason(&self) -> Option<&DisconnectReason> {
        self.disconnect_reason.as_ref()
    }
}

/// Bidirectional entity id registry. Every runtime id appears exactly
/// once; lookups from either namespace return the same record.
struct EntityRegistry {
    by_java: AHashMap<i32, u64>,
    entries: AHashMap<u64, Entity>,
    next_runtime_id: u64,
}

impl EntityRegistry {
    fn new() -> Self {
        Self {
            by_java: AHashMap::new(),
            entries: AHashMap::new(),
            next_runtime_id: PLAYER_RUNTIME_ID + 1,
        }
    }

    fn insert(&mut self, entity: Entity) {
        self.by_java.insert(entity.java_id, entity.runtime_id);
        self.entries.insert(entity.runtime_id, entity);
    }

    fn register(
        &mut self,
        java_id: i32,
        kind: i32,
        position: EntityPosition,
        is_player: bool,
    ) -> u64 {
        // A respawning java id gets a fresh runtime id; the stale
        // record is dropped first to keep the two maps consistent.
        if let Some(stale) = self.by_java.get(&java_id).copied() {
            self.entries.remove(&stale);
        }
        let runtime_id = self.next_runtime_id;
        self.next_runtime_id += 1;
        self.insert(Entity {
            java_id,
            runtime_id,
            kind,
            position,
            is_player,
        });
        runtime_id
    }

    fn remove_by_java(&mut self, java_id: i32) -> Option<Entity> {
        let runtime_id = self.by_java.remove(&java_id)?;
        self.entries.remove(&runtime_id)
    }

    fn by_java(&self, java_id: i32) -> Option<&Entity> {
        self.entries.get(self.by_java.get(&java_id)?)
    }

    fn by_runtime(&self, runtime_id: u64) -> Option<&Entity> {
        self.entries.get(&runtime_id)
    }

    fn update_position(&mut self, java_id: i32, position: EntityPosition) {
        if let Some(runtime_id) = self.by_java.get(&java_id) {
            if let Some(entity) = self.entries.get_mut(runtime_id) {
                entity.position = position;
            }
        }
    }

    fn clear_except_player(&mut self) -> Vec<Entity> {
        let removed: Vec<Entity> = self
            .entries
            .values()
            .filter(|entity| !entity.is_player)
            .cloned()
            .collect();
        for entity in &removed {
            self.by_java.remove(&entity.java_id);
            self.entries.remove(&entity.runtime_id);
        }
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_session() -> (Session, flume::Receiver<Packet>) {
        let (tx, rx) = flume::bounded(16);
        (Session::new(1, tx), rx)
    }

    fn pos(x: f64, y: f64, z: f64) -> EntityPosition {
        EntityPosition {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    #[test]
    fn entity_lookup_agrees_in_both_directions() {
        let (mut session, _rx) = test_session();
        let runtime_id = session.register_entity(42, 51, pos(1.0, 2.0, 3.0), false);

        let by_java = session.get_entity_by_java_id(42).unwrap();
        let by_runtime = session.get_entity_by_bedrock_id(runtime_id).unwrap();
        assert_eq!(by_java.runtime_id, by_runtime.runtime_id);
        assert_eq!(by_java.java_id, by_runtime.java_id);
        assert_eq!(by_java.kind, 51);
    }

    #[test]
    fn runtime_ids_are_never_reused() {
        let (mut session, _rx) = test_session();
        let first = session.register_entity(1, 0, pos(0.0, 0.0, 0.0), false);
        session.unregister_entity(1);
        let second = session.register_entity(1, 0, pos(0.0, 0.0, 0.0), false);
        assert_ne!(first, second);
        assert!(second > first);
        // Neither collides with the player's reserved id.
        assert_ne!(first, PLAYER_RUNTIME_ID);
        assert_ne!(second, PLAYER_RUNTIME_ID);
    }

    #[test]
    fn reregistering_a_java_id_keeps_the_maps_consistent() {
        let (mut session, _rx) = test_session();
        let stale = session.register_entity(7, 0, pos(0.0, 0.0, 0.0), false);
        let fresh = session.register_entity(7, 0, pos(0.0, 0.0, 0.0), false);
        assert!(session.get_entity_by_bedrock_id(stale).is_none());
        assert_eq!(session.get_entity_by_java_id(7).unwrap().runtime_id, fresh);
        assert_eq!(session.entity_count(), 1);
    }

    #[test]
    fn chunk_set_tracks_loads_and_unloads() {
        let (mut session, _rx) = test_session();
        let chunk = ChunkPosition { x: 3, z: -1 };
        session.remember_chunk(chunk);
        assert!(session.holds_chunk(chunk));
        assert_eq!(session.chunk_count(), 1);
        assert!(session.forget_chunk(chunk));
        assert!(!session.forget_chunk(chunk));
        assert_eq!(session.chunk_count(), 0);
    }

    #[test]
    fn form_ids_strictly_increase() {
        let (mut session, _rx) = test_session();
        let a = session.next_form_id();
        let b = session.next_form_id();
        let c = session.next_form_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn form_slot_is_single_shot() {
        let (mut session, _rx) = test_session();
        let id = session.next_form_id();
        let mut receiver = session.put_pending_form(id);

        assert!(session.complete_form(id, Some(json!(["yes"]))));
        // The second response with the same id is dropped.
        assert!(!session.complete_form(id, Some(json!(["no"]))));

        let response = receiver.try_recv().unwrap();
        assert_eq!(response, Some(json!(["yes"])));
    }

    #[test]
    fn forms_expire_on_tick() {
        let (mut session, _rx) = test_session();
        let id = session.next_form_id();
        let mut receiver = session.put_pending_form(id);
        for _ in 0..FORM_TIMEOUT_TICKS {
            session.handle_tick();
        }
        assert_eq!(session.pending_form_count(), 0);
        assert_eq!(receiver.try_recv().unwrap(), None);
    }

    #[test]
    fn send_form_emits_request_with_matching_id() {
        let (mut session, rx) = test_session();
        let form = Form::Modal {
            title: "t".into(),
            content: "c".into(),
            yes_button: "y".into(),
            no_button: "n".into(),
        };
        let _receiver = session.send_form(&form);
        match rx.try_recv().unwrap() {
            Packet::ModalFormRequest(request) => {
                assert_eq!(request.form_id, 1);
                assert!(request.form_data.contains("modal"));
            }
            other => panic!("unexpected packet {}", other.as_ref()),
        }
    }

    #[test]
    fn disconnect_is_idempotent_and_first_reason_wins() {
        let (mut session, rx) = test_session();
        session.disconnect(DisconnectReason::Kicked("a".into()));
        session.disconnect(DisconnectReason::Kicked("b".into()));

        assert_eq!(
            session.disconnect_reason(),
            Some(&DisconnectReason::Kicked("a".into()))
        );
        // Exactly one disconnect frame.
        let frames: Vec<Packet> = rx.try_iter().collect();
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            Packet::Disconnect(packet) => assert_eq!(packet.message, "a"),
            other => panic!("unexpected packet {}", other.as_ref()),
        }
    }

    #[test]
    fn dead_session_never_emits() {
        let (mut session, rx) = test_session();
        session.disconnect(DisconnectReason::Shutdown);
        rx.try_iter().count(); // drain the disconnect frame
        session.mark_dead();

        session.send_bedrock(Packet::SetTime(bedrock::SetTime { time: 0 }));
        session.send_java(play::Serverbound::KeepAliveServerbound(
            play::KeepAliveServerbound { id: 1 },
        ));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn disconnect_cancels_pending_forms() {
        let (mut session, _rx) = test_session();
        let id = session.next_form_id();
        let mut receiver = session.put_pending_form(id);
        session.disconnect(DisconnectReason::Shutdown);
        assert_eq!(receiver.try_recv().unwrap(), None);
    }

    #[test]
    fn saturated_buffer_eventually_disconnects() {
        let (tx, rx) = flume::bounded(1);
        let mut session = Session::new(1, tx);
        // Fill the only slot; everything after saturates.
        session.send_bedrock(Packet::SetTime(bedrock::SetTime { time: 0 }));
        for _ in 0..SATURATION_LIMIT {
            session.send_bedrock(Packet::SetTime(bedrock::SetTime { time: 1 }));
        }
        assert_eq!(session.state(), AuthState::Disconnecting);
        assert_eq!(
            session.disconnect_reason(),
            Some(&DisconnectReason::Backpressure)
        );
        drop(rx);
    }

    #[test]
    fn spawned_is_entered_exactly_once() {
        let (mut session, _rx) = test_session();
        assert_eq!(session.state(), AuthState::Unauthenticated);
        session.begin_java_login();
        assert_eq!(session.state(), AuthState::AwaitingJavaLogin);
        assert!(session.mark_spawned());
        assert!(!session.mark_spawned());
        assert_eq!(session.state(), AuthState::Spawned);
    }

    #[test]
    fn scheduled_tasks_run_at_their_tick() {
        let (mut session, rx) = test_session();
        session.schedule(2, |session| {
            session.send_bedrock(Packet::SetTime(bedrock::SetTime { time: 99 }));
        });
        session.handle_tick();
        assert_eq!(rx.try_iter().count(), 0);
        session.handle_tick();
        assert_eq!(rx.try_iter().count(), 1);
    }
}
