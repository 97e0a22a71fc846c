/*!
Per-process rig core.

A [`RigNode`] is everything one participant's process runs: the local hardware
rig and its locomotion, the spawner for the local participant, the input
handler the transport polls, and the local copies of every spawned actor.

The host drives it with two independent ticks and passes the transport in each
time:
- [`RigNode::fixed_step`] once per fixed simulation step,
- [`RigNode::render_frame`] once per rendered frame.
*/

use crate::{
    actor::{AvatarActor, NetworkActor, RigActor},
    constants::{DEFAULT_AVATAR_MOVE_SPEED, SPAWN_AREA_MAX, SPAWN_AREA_MIN, SPAWN_HEIGHT},
    ground::GroundProbe,
    hardware::{HardwareRig, TrackingFrame},
    locomotion::{AnalogInput, LocomotionController, LocomotionSettings},
    pose::{Pose, Quat, Vec3},
    rig::PlayerMoveSample,
    session::{
        ActorId, ActorPrototype, InputFrame, InputHandler, PlayerRef, SessionEvent, SessionResult,
        SessionTransport, loopback::LoopbackHub,
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;

/// Area a freshly joined participant's actor is spawned in. X and Z land on whole meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnArea {
    /// Inclusive lower bound on X and Z.
    pub min: i32,
    /// Exclusive upper bound on X and Z.
    pub max: i32,
    pub height: f32,
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self {
            min: SPAWN_AREA_MIN,
            max: SPAWN_AREA_MAX,
            height: SPAWN_HEIGHT,
        }
    }
}

impl SpawnArea {
    pub fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        if self.max <= self.min {
            return Vec3::new(self.min as f32, self.height, self.min as f32);
        }
        Vec3::new(
            rng.gen_range(self.min..self.max) as f32,
            self.height,
            rng.gen_range(self.min..self.max) as f32,
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct NodeSettings {
    /// What the local participant spawns when it joins.
    pub prototype: ActorPrototype,
    pub locomotion: LocomotionSettings,
    pub avatar_move_speed: f32,
    pub spawn_area: SpawnArea,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            prototype: ActorPrototype::Rig,
            locomotion: LocomotionSettings::default(),
            avatar_move_speed: DEFAULT_AVATAR_MOVE_SPEED,
            spawn_area: SpawnArea::default(),
        }
    }
}

pub struct RigNode {
    player: PlayerRef,
    settings: NodeSettings,
    hardware: Option<HardwareRig>,
    locomotion: LocomotionController,
    /// Latest stick state, polled on the render tick and reused for input collection.
    analog: AnalogInput,
    actors: BTreeMap<ActorId, NetworkActor>,
    rng: StdRng,
    shut_down: bool,
}

impl RigNode {
    pub fn new(player: PlayerRef, settings: NodeSettings) -> Self {
        Self::with_rng(player, settings, StdRng::from_entropy())
    }

    pub fn with_rng(player: PlayerRef, settings: NodeSettings, rng: StdRng) -> Self {
        Self {
            player,
            settings,
            hardware: None,
            locomotion: LocomotionController::new(settings.locomotion),
            analog: AnalogInput::default(),
            actors: BTreeMap::new(),
            rng,
            shut_down: false,
        }
    }

    pub fn player(&self) -> PlayerRef {
        self.player
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Attach the local hardware rig. Without one, the local rig is never smoothed and no
    /// rig input is sent.
    pub fn bind_hardware(&mut self, hardware: HardwareRig) {
        self.hardware = Some(hardware);
    }

    pub fn hardware(&self) -> Option<&HardwareRig> {
        self.hardware.as_ref()
    }

    pub fn hardware_mut(&mut self) -> Option<&mut HardwareRig> {
        self.hardware.as_mut()
    }

    pub fn locomotion(&self) -> &LocomotionController {
        &self.locomotion
    }

    pub fn actors(&self) -> impl Iterator<Item = &NetworkActor> {
        self.actors.values()
    }

    pub fn actor(&self, id: ActorId) -> Option<&NetworkActor> {
        self.actors.get(&id)
    }

    /// The actor owned by this participant, if it has spawned.
    pub fn local_actor(&self) -> Option<&NetworkActor> {
        self.actors.values().find(|actor| actor.owner() == self.player)
    }

    /// Drain pending session notifications.
    pub fn handle_events(&mut self, transport: &mut impl SessionTransport) -> SessionResult<()> {
        while let Some(event) = transport.poll_event() {
            self.handle_event(transport, event)?;
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        transport: &mut impl SessionTransport,
        event: SessionEvent,
    ) -> SessionResult<()> {
        match event {
            SessionEvent::PlayerJoined(player) => {
                log::info!("{player} joined; local is {}", self.player);
                if player == self.player {
                    self.spawn_local(transport)?;
                }
            }
            SessionEvent::PlayerLeft(player) => log::info!("{player} left"),
            SessionEvent::ActorSpawned {
                id,
                prototype,
                owner,
                pose,
            } => self.on_actor_spawned(id, prototype, owner, pose),
            SessionEvent::ActorDespawned(id) => {
                if self.actors.remove(&id).is_some() {
                    log::info!("Removed {id}");
                }
            }
            SessionEvent::Shutdown => {
                log::info!("Session shut down; dropping {} actors", self.actors.len());
                self.actors.clear();
                self.shut_down = true;
            }
        }
        Ok(())
    }

    fn spawn_local(&mut self, transport: &mut impl SessionTransport) -> SessionResult<()> {
        let position = self.settings.spawn_area.sample(&mut self.rng);
        let rotation = Quat::identity();

        // Start the live rig where its networked copy appears.
        if let Some(hardware) = self.hardware.as_mut() {
            *hardware.character_mut() = Pose::new(position, rotation);
        }

        transport.request_spawn(self.settings.prototype, position, rotation, self.player)?;
        Ok(())
    }

    fn on_actor_spawned(
        &mut self,
        id: ActorId,
        prototype: ActorPrototype,
        owner: PlayerRef,
        pose: Pose,
    ) {
        let is_local = owner == self.player;
        let actor = match prototype {
            ActorPrototype::Rig => {
                if is_local && self.hardware.is_none() {
                    log::error!("Missing hardware rig for local {id}");
                }
                NetworkActor::Rig(RigActor::new(id, owner, is_local, pose))
            }
            ActorPrototype::Avatar => NetworkActor::Avatar(AvatarActor::new(
                id,
                owner,
                is_local,
                pose,
                self.settings.avatar_move_speed,
            )),
        };

        log::info!(
            "Created {prototype:?} {id} owned by {owner} ({})",
            if is_local { "local" } else { "remote" }
        );
        self.actors.insert(id, actor);
    }

    /// One fixed simulation step for a node driven on its own.
    ///
    /// Actors this participant has authority over consume their owner's input and
    /// publish the result; all others adopt the latest replicated state.
    pub fn fixed_step(&mut self, transport: &mut impl SessionTransport) -> SessionResult<()> {
        self.handle_events(transport)?;
        self.simulate_authority(transport)?;
        self.adopt_replicated(&*transport);
        Ok(())
    }

    /// Authority half of a fixed step: apply input to every actor this participant
    /// simulates and publish the result.
    pub fn simulate_authority(
        &mut self,
        transport: &mut impl SessionTransport,
    ) -> SessionResult<()> {
        let dt = transport.delta_time();

        for actor in self.actors.values_mut() {
            let owner = actor.owner();
            if !transport.has_state_authority(owner) {
                continue;
            }

            let input = transport.input(owner).copied();
            let applied = match actor {
                NetworkActor::Rig(rig) => rig.apply_step(input.as_ref().and_then(|f| f.rig.as_ref())),
                NetworkActor::Avatar(avatar) => {
                    avatar.apply_step(input.as_ref().and_then(|f| f.movement.as_ref()), dt)
                }
            };
            if !applied {
                log::debug!("Missing input for {owner} at tick {}", transport.tick());
            }

            transport.publish_state(actor.id(), actor.replicated_state())?;
        }
        Ok(())
    }

    /// Observer half of a fixed step: copy the published state of every actor simulated
    /// elsewhere.
    pub fn adopt_replicated(&mut self, transport: &impl SessionTransport) {
        for actor in self.actors.values_mut() {
            if transport.has_state_authority(actor.owner()) {
                continue;
            }
            if let Some(state) = transport.replicated_state(actor.id()).copied() {
                actor.apply_replicated(&state);
            }
        }
    }

    /// One render frame: poll sticks and tracking, run locomotion on the live rig, then
    /// refresh the interpolation targets of the local rig.
    pub fn render_frame(
        &mut self,
        analog: AnalogInput,
        tracking: Option<&TrackingFrame>,
        ground: &impl GroundProbe,
        dt: f32,
    ) {
        self.analog = analog;

        if let Some(hardware) = self.hardware.as_mut() {
            if let Some(frame) = tracking {
                hardware.apply_tracking(frame);
            }
            self.locomotion.tick(hardware, &self.analog, ground, dt);
        }

        let hardware = self.hardware.as_ref();
        for actor in self.actors.values_mut() {
            if let NetworkActor::Rig(rig) = actor {
                rig.apply_render_frame(hardware);
            }
        }
    }
}

impl InputHandler for RigNode {
    fn on_input(&mut self, input: &mut InputFrame) {
        if let Some(hardware) = self.hardware.as_ref() {
            input.rig = Some(hardware.sample());
        }
        input.movement = Some(PlayerMoveSample::from_axis(self.analog.movement));
    }
}

/// Run one fixed step for every node sharing an in-process session.
///
/// Events are drained first so spawns requested this tick are visible to everyone,
/// then input is collected. Every node publishes what it simulates before any node
/// copies replicated state, so observers see the state of the same tick in either
/// authority mode.
pub fn step_loopback(hub: &mut LoopbackHub, nodes: &mut [&mut RigNode]) -> SessionResult<()> {
    for node in nodes.iter_mut() {
        node.handle_events(&mut hub.peer(node.player()))?;
    }
    for node in nodes.iter_mut() {
        hub.collect_input(node.player(), &mut **node)?;
    }
    for node in nodes.iter_mut() {
        node.simulate_authority(&mut hub.peer(node.player()))?;
    }
    for node in nodes.iter_mut() {
        node.adopt_replicated(&hub.peer(node.player()));
    }

    hub.end_tick();
    Ok(())
}
