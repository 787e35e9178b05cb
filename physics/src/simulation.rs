//! Simulations, their participants, and the indexed simulation set.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Callbacks a participant receives on every simulation step.
pub trait SimulationUpdate: Send + Sync {
    /// Called before the simulation advances.
    fn simulation_update(&self, dt: f32);

    /// Called once every participant has run [`simulation_update`](Self::simulation_update).
    fn after_simulation_update(&self, _dt: f32) {}
}

/// Handle identifying one registration with a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(u64);

struct Participant {
    id: ParticipantId,
    target: Arc<dyn SimulationUpdate>,
    // Outstanding registrations sharing this entry.
    refs: usize,
}

/// Participants of one simulation, updated in registration order.
pub struct Simulation {
    index: usize,
    next_id: AtomicU64,
    participants: RwLock<Vec<Participant>>,
}

impl Simulation {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            next_id: AtomicU64::new(0),
            participants: RwLock::new(Vec::new()),
        }
    }

    /// Position of this simulation in its [`SimulationSet`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Add a participant.
    ///
    /// Registering the same participant again shares its entry and id; the
    /// entry stays until every registration is undone.
    pub fn register(&self, participant: Arc<dyn SimulationUpdate>) -> ParticipantId {
        let mut participants = self.participants.write();
        if let Some(existing) = participants
            .iter_mut()
            .find(|p| Arc::ptr_eq(&p.target, &participant))
        {
            existing.refs += 1;
            log::debug!(
                "Participant {:?} registered with simulation {} {} times",
                existing.id,
                self.index,
                existing.refs
            );
            return existing.id;
        }
        let id = ParticipantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        participants.push(Participant {
            id,
            target: participant,
            refs: 1,
        });
        id
    }

    /// Undo one registration; `false` if `id` was not registered.
    pub fn unregister(&self, id: ParticipantId) -> bool {
        let mut participants = self.participants.write();
        let Some(position) = participants.iter().position(|p| p.id == id) else {
            return false;
        };
        let entry = &mut participants[position];
        entry.refs -= 1;
        if entry.refs == 0 {
            participants.remove(position);
        }
        true
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.read().iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.participants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.read().is_empty()
    }

    /// Run every participant's update, then every after-update.
    ///
    /// Participants registered or removed by a callback take effect on the
    /// next step.
    pub fn step(&self, dt: f32) {
        let snapshot: Vec<Arc<dyn SimulationUpdate>> = self
            .participants
            .read()
            .iter()
            .map(|p| p.target.clone())
            .collect();
        for participant in &snapshot {
            participant.simulation_update(dt);
        }
        for participant in &snapshot {
            participant.after_simulation_update(dt);
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("index", &self.index)
            .field("participants", &self.len())
            .finish()
    }
}

/// Fixed, indexed collection of simulations.
#[derive(Debug)]
pub struct SimulationSet {
    simulations: Vec<Arc<Simulation>>,
}

impl SimulationSet {
    pub fn new(count: usize) -> Self {
        Self {
            simulations: (0..count).map(|i| Arc::new(Simulation::new(i))).collect(),
        }
    }

    pub fn simulation(&self, index: usize) -> Option<&Arc<Simulation>> {
        self.simulations.get(index)
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Simulation>> {
        self.simulations.iter()
    }

    /// Step every simulation in index order.
    pub fn step_all(&self, dt: f32) {
        for simulation in &self.simulations {
            simulation.step(dt);
        }
    }
}
