use super::{
    ActorId, ActorPrototype, AuthorityMode, InputFrame, InputHandler, PlayerRef, ReplicatedState,
    SessionError, SessionEvent, SessionResult, SessionTransport,
};
use crate::{
    constants::DEFAULT_FIXED_DT,
    pose::{Pose, Quat, Vec3},
    rig::RigPoses,
};
use std::collections::{BTreeMap, HashMap, VecDeque};

#[derive(Clone, Copy, Debug)]
pub struct LoopbackConfig {
    pub mode: AuthorityMode,
    /// Fixed step length in seconds.
    pub fixed_dt: f32,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            mode: AuthorityMode::Host,
            fixed_dt: DEFAULT_FIXED_DT,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SpawnRecord {
    prototype: ActorPrototype,
    owner: PlayerRef,
    pose: Pose,
}

/// In-process session: every participant lives in the same process and input is
/// delivered instantly.
///
/// Per fixed step the host loop is expected to:
/// 1. [`collect_input`](Self::collect_input) for every participant that has input,
/// 2. let every node simulate and publish the actors it has authority over,
/// 3. let every node copy the replicated state of the remaining actors,
/// 4. [`end_tick`](Self::end_tick).
///
/// [`step_loopback`](crate::node::step_loopback) does exactly that.
#[derive(Debug, Default)]
pub struct LoopbackHub {
    config: LoopbackConfig,
    players: Vec<PlayerRef>,
    next_player: u32,
    next_actor: u64,
    actors: BTreeMap<ActorId, SpawnRecord>,
    states: HashMap<ActorId, ReplicatedState>,
    inputs: HashMap<PlayerRef, InputFrame>,
    queues: HashMap<PlayerRef, VecDeque<SessionEvent>>,
    tick: u64,
    shut_down: bool,
}

impl LoopbackHub {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }

    /// The participant holding authority in [`AuthorityMode::Host`]: the earliest one still present.
    pub fn host(&self) -> Option<PlayerRef> {
        self.players.first().copied()
    }

    pub fn players(&self) -> &[PlayerRef] {
        &self.players
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Add a participant. The newcomer is told about everyone already present and every
    /// live actor; everyone else is told about the newcomer.
    pub fn join(&mut self) -> SessionResult<PlayerRef> {
        if self.shut_down {
            return Err(SessionError::Shutdown);
        }

        self.next_player += 1;
        let player = PlayerRef(self.next_player);

        let mut queue: VecDeque<SessionEvent> = self
            .players
            .iter()
            .map(|&existing| SessionEvent::PlayerJoined(existing))
            .collect();
        queue.extend(self.actors.iter().map(|(&id, record)| SessionEvent::ActorSpawned {
            id,
            prototype: record.prototype,
            owner: record.owner,
            pose: record.pose,
        }));

        self.players.push(player);
        self.queues.insert(player, queue);
        self.broadcast(SessionEvent::PlayerJoined(player));
        log::info!("{player} joined the session ({} present)", self.players.len());

        Ok(player)
    }

    /// Remove a participant and despawn its actors. In host mode the host leaving ends
    /// the session.
    pub fn leave(&mut self, player: PlayerRef) -> SessionResult<()> {
        let Some(index) = self.players.iter().position(|&p| p == player) else {
            return Err(SessionError::UnknownPlayer(player));
        };
        let was_host = index == 0;

        self.players.remove(index);
        self.queues.remove(&player);
        self.inputs.remove(&player);

        let owned: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, record)| record.owner == player)
            .map(|(&id, _)| id)
            .collect();
        for id in owned {
            self.remove_actor(id);
        }

        self.broadcast(SessionEvent::PlayerLeft(player));
        log::info!("{player} left the session");

        if was_host && self.config.mode == AuthorityMode::Host {
            self.shut_down();
        }
        Ok(())
    }

    /// Ask `handler` for `player`'s input for the current tick.
    pub fn collect_input(
        &mut self,
        player: PlayerRef,
        handler: &mut impl InputHandler,
    ) -> SessionResult<()> {
        if !self.players.contains(&player) {
            return Err(SessionError::UnknownPlayer(player));
        }

        let mut frame = InputFrame::default();
        handler.on_input(&mut frame);
        self.inputs.insert(player, frame);
        Ok(())
    }

    /// Simulate `player`'s input arriving too late for the current tick.
    pub fn drop_input(&mut self, player: PlayerRef) {
        self.inputs.remove(&player);
    }

    /// Close the current tick: consumed inputs are discarded.
    pub fn end_tick(&mut self) {
        self.inputs.clear();
        self.tick += 1;
    }

    /// `player`'s view of the session.
    pub fn peer(&mut self, player: PlayerRef) -> LoopbackPeer<'_> {
        LoopbackPeer { hub: self, player }
    }

    fn shut_down(&mut self) {
        log::info!("Session shut down");
        self.shut_down = true;
        self.actors.clear();
        self.states.clear();
        self.inputs.clear();
        self.broadcast(SessionEvent::Shutdown);
    }

    fn remove_actor(&mut self, id: ActorId) {
        self.actors.remove(&id);
        self.states.remove(&id);
        self.broadcast(SessionEvent::ActorDespawned(id));
    }

    fn broadcast(&mut self, event: SessionEvent) {
        for queue in self.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    fn has_state_authority(&self, viewer: PlayerRef, owner: PlayerRef) -> bool {
        match self.config.mode {
            AuthorityMode::Host => self.host() == Some(viewer),
            AuthorityMode::Shared => viewer == owner,
        }
    }
}

/// One participant's handle onto a [`LoopbackHub`].
pub struct LoopbackPeer<'a> {
    hub: &'a mut LoopbackHub,
    player: PlayerRef,
}

impl SessionTransport for LoopbackPeer<'_> {
    fn local_player(&self) -> PlayerRef {
        self.player
    }

    fn has_state_authority(&self, owner: PlayerRef) -> bool {
        self.hub.has_state_authority(self.player, owner)
    }

    fn request_spawn(
        &mut self,
        prototype: ActorPrototype,
        position: Vec3,
        rotation: Quat,
        owner: PlayerRef,
    ) -> SessionResult<ActorId> {
        if self.hub.shut_down {
            return Err(SessionError::Shutdown);
        }
        if !self.hub.players.contains(&owner) {
            return Err(SessionError::UnknownPlayer(owner));
        }

        self.hub.next_actor += 1;
        let id = ActorId(self.hub.next_actor);
        let pose = Pose::new(position, rotation);
        let state = match prototype {
            ActorPrototype::Rig => ReplicatedState::Rig(RigPoses::uniform(pose)),
            ActorPrototype::Avatar => ReplicatedState::Avatar(pose),
        };

        self.hub.actors.insert(
            id,
            SpawnRecord {
                prototype,
                owner,
                pose,
            },
        );
        self.hub.states.insert(id, state);
        self.hub.broadcast(SessionEvent::ActorSpawned {
            id,
            prototype,
            owner,
            pose,
        });
        log::info!("Spawned {prototype:?} {id} for {owner}");

        Ok(id)
    }

    fn despawn(&mut self, id: ActorId) -> SessionResult<()> {
        let Some(record) = self.hub.actors.get(&id) else {
            return Err(SessionError::UnknownActor(id));
        };
        if record.owner != self.player && !self.has_state_authority(record.owner) {
            return Err(SessionError::NotAuthority {
                actor: id,
                player: self.player,
            });
        }

        self.hub.remove_actor(id);
        Ok(())
    }

    fn input(&self, player: PlayerRef) -> Option<&InputFrame> {
        self.hub.inputs.get(&player)
    }

    fn publish_state(&mut self, id: ActorId, state: ReplicatedState) -> SessionResult<()> {
        let Some(record) = self.hub.actors.get(&id) else {
            return Err(SessionError::UnknownActor(id));
        };
        if !self.has_state_authority(record.owner) {
            return Err(SessionError::NotAuthority {
                actor: id,
                player: self.player,
            });
        }

        self.hub.states.insert(id, state);
        Ok(())
    }

    fn replicated_state(&self, id: ActorId) -> Option<&ReplicatedState> {
        self.hub.states.get(&id)
    }

    fn poll_event(&mut self) -> Option<SessionEvent> {
        self.hub.queues.get_mut(&self.player)?.pop_front()
    }

    fn delta_time(&self) -> f32 {
        self.hub.config.fixed_dt
    }

    fn tick(&self) -> u64 {
        self.hub.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::PlayerMoveSample;

    struct FixedInput(PlayerMoveSample);

    impl InputHandler for FixedInput {
        fn on_input(&mut self, input: &mut InputFrame) {
            input.movement = Some(self.0);
        }
    }

    fn drain(peer: &mut LoopbackPeer<'_>) -> Vec<SessionEvent> {
        std::iter::from_fn(|| peer.poll_event()).collect()
    }

    #[test]
    fn join_announces_players_to_everyone() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let b = hub.join().unwrap();

        assert_eq!(
            drain(&mut hub.peer(a)),
            vec![SessionEvent::PlayerJoined(a), SessionEvent::PlayerJoined(b)]
        );
        assert_eq!(
            drain(&mut hub.peer(b)),
            vec![SessionEvent::PlayerJoined(a), SessionEvent::PlayerJoined(b)]
        );
        assert_eq!(hub.host(), Some(a));
    }

    #[test]
    fn late_joiner_learns_about_existing_actors() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let id = hub
            .peer(a)
            .request_spawn(ActorPrototype::Rig, Vec3::new(2.0, 0.5, 3.0), Quat::identity(), a)
            .unwrap();

        let b = hub.join().unwrap();
        let events = drain(&mut hub.peer(b));

        assert!(events.contains(&SessionEvent::ActorSpawned {
            id,
            prototype: ActorPrototype::Rig,
            owner: a,
            pose: Pose::from_translation(Vec3::new(2.0, 0.5, 3.0)),
        }));
        assert_eq!(events.last(), Some(&SessionEvent::PlayerJoined(b)));
    }

    #[test]
    fn input_is_available_for_one_tick_only() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let sample = PlayerMoveSample {
            direction: Vec3::new(1.0, 0.0, 0.0),
        };

        hub.collect_input(a, &mut FixedInput(sample)).unwrap();
        assert_eq!(hub.peer(a).input(a).and_then(|f| f.movement), Some(sample));

        hub.end_tick();
        assert_eq!(hub.peer(a).input(a), None);
        assert_eq!(hub.tick(), 1);
    }

    #[test]
    fn dropped_input_reads_as_missing() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();

        hub.collect_input(a, &mut FixedInput(PlayerMoveSample::default()))
            .unwrap();
        hub.drop_input(a);

        assert_eq!(hub.peer(a).input(a), None);
    }

    #[test]
    fn host_mode_gives_authority_to_first_player_only() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let b = hub.join().unwrap();

        assert!(hub.peer(a).has_state_authority(b));
        assert!(!hub.peer(b).has_state_authority(b));

        let id = hub
            .peer(b)
            .request_spawn(ActorPrototype::Avatar, Vec3::zeros(), Quat::identity(), b)
            .unwrap();
        let state = ReplicatedState::Avatar(Pose::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        assert_eq!(
            hub.peer(b).publish_state(id, state),
            Err(SessionError::NotAuthority { actor: id, player: b })
        );
        assert_eq!(hub.peer(a).publish_state(id, state), Ok(()));
        assert_eq!(hub.peer(b).replicated_state(id), Some(&state));
    }

    #[test]
    fn shared_mode_gives_authority_to_owner() {
        let mut hub = LoopbackHub::new(LoopbackConfig {
            mode: AuthorityMode::Shared,
            ..LoopbackConfig::default()
        });
        let a = hub.join().unwrap();
        let b = hub.join().unwrap();

        assert!(hub.peer(a).has_state_authority(a));
        assert!(!hub.peer(a).has_state_authority(b));
        assert!(hub.peer(b).has_state_authority(b));
    }

    #[test]
    fn leaving_despawns_owned_actors() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let b = hub.join().unwrap();
        let id = hub
            .peer(b)
            .request_spawn(ActorPrototype::Rig, Vec3::zeros(), Quat::identity(), b)
            .unwrap();
        drain(&mut hub.peer(a));

        hub.leave(b).unwrap();

        assert_eq!(hub.actor_count(), 0);
        assert_eq!(
            drain(&mut hub.peer(a)),
            vec![SessionEvent::ActorDespawned(id), SessionEvent::PlayerLeft(b)]
        );
        assert_eq!(hub.leave(b), Err(SessionError::UnknownPlayer(b)));
    }

    #[test]
    fn host_leaving_shuts_the_session_down() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();
        let b = hub.join().unwrap();

        hub.leave(a).unwrap();

        assert!(hub.is_shut_down());
        assert_eq!(drain(&mut hub.peer(b)).last(), Some(&SessionEvent::Shutdown));
        assert_eq!(
            hub.peer(b)
                .request_spawn(ActorPrototype::Rig, Vec3::zeros(), Quat::identity(), b),
            Err(SessionError::Shutdown)
        );
        assert_eq!(hub.join(), Err(SessionError::Shutdown));
    }

    #[test]
    fn spawning_for_unknown_owner_fails() {
        let mut hub = LoopbackHub::default();
        let a = hub.join().unwrap();

        assert_eq!(
            hub.peer(a).request_spawn(
                ActorPrototype::Rig,
                Vec3::zeros(),
                Quat::identity(),
                PlayerRef(99)
            ),
            Err(SessionError::UnknownPlayer(PlayerRef(99)))
        );
    }
}
