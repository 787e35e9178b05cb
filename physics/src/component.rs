//! Lifecycle component tying a participant to a simulation index.

use std::sync::Arc;

use crate::error::PhysicsError;
use crate::simulation::{ParticipantId, Simulation, SimulationSet, SimulationUpdate};

/// Keeps a participant registered with the simulation picked by its index.
///
/// The component is inert until [`start`](Self::start). While started,
/// changing [`simulation_index`](Self::simulation_index) moves the
/// registration to the new simulation. Dropping the component unregisters.
pub struct SimulationUpdateComponent<T: SimulationUpdate + 'static> {
    target: Arc<T>,
    simulation_index: usize,
    set: Option<Arc<SimulationSet>>,
    registration: Option<(Arc<Simulation>, ParticipantId)>,
}

impl<T: SimulationUpdate + 'static> SimulationUpdateComponent<T> {
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            simulation_index: 0,
            set: None,
            registration: None,
        }
    }

    pub fn with_simulation_index(mut self, index: usize) -> Self {
        self.simulation_index = index;
        self
    }

    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    pub fn simulation_index(&self) -> usize {
        self.simulation_index
    }

    pub fn is_started(&self) -> bool {
        self.registration.is_some()
    }

    /// Simulation the participant is currently registered with.
    pub fn simulation(&self) -> Option<&Arc<Simulation>> {
        self.registration.as_ref().map(|(simulation, _)| simulation)
    }

    /// Register with the simulation at the current index.
    ///
    /// Starting an already started component re-registers it with `set`.
    pub fn start(&mut self, set: &Arc<SimulationSet>) -> Result<(), PhysicsError> {
        let simulation = lookup(set, self.simulation_index)?;
        self.cancel();
        self.register(simulation);
        self.set = Some(set.clone());
        Ok(())
    }

    /// Unregister; the component can be started again later.
    pub fn cancel(&mut self) {
        if let Some((simulation, id)) = self.registration.take() {
            simulation.unregister(id);
            log::debug!("Unregistered participant from simulation {}", simulation.index());
        }
        self.set = None;
    }

    /// Change the simulation index, moving the registration when started.
    ///
    /// On error the component keeps its previous index and registration.
    pub fn set_simulation_index(&mut self, index: usize) -> Result<(), PhysicsError> {
        if index == self.simulation_index {
            return Ok(());
        }
        if let (Some(set), Some((current, id))) = (&self.set, &self.registration) {
            let next = lookup(set, index)?;
            current.unregister(*id);
            self.register(next);
        }
        self.simulation_index = index;
        Ok(())
    }

    fn register(&mut self, simulation: Arc<Simulation>) {
        let participant: Arc<dyn SimulationUpdate> = self.target.clone();
        let id = simulation.register(participant);
        log::debug!("Registered participant with simulation {}", simulation.index());
        self.registration = Some((simulation, id));
    }
}

impl<T: SimulationUpdate + 'static> Drop for SimulationUpdateComponent<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lookup(set: &SimulationSet, index: usize) -> Result<Arc<Simulation>, PhysicsError> {
    set.simulation(index)
        .cloned()
        .ok_or(PhysicsError::SimulationOutOfRange {
            index,
            count: set.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl SimulationUpdate for Counter {
        fn simulation_update(&self, _dt: f32) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn inert_until_started() {
        let set = Arc::new(SimulationSet::new(1));
        let mut component = SimulationUpdateComponent::new(Arc::new(Counter::default()));
        set.step_all(0.1);
        assert_eq!(component.target().0.load(Ordering::Relaxed), 0);

        component.start(&set).unwrap();
        set.step_all(0.1);
        assert_eq!(component.target().0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn out_of_range_start_fails() {
        let set = Arc::new(SimulationSet::new(2));
        let mut component =
            SimulationUpdateComponent::new(Arc::new(Counter::default())).with_simulation_index(5);
        assert_eq!(
            component.start(&set),
            Err(PhysicsError::SimulationOutOfRange { index: 5, count: 2 })
        );
        assert!(!component.is_started());
    }

    #[test]
    fn index_change_before_start_is_stored() {
        let mut component = SimulationUpdateComponent::new(Arc::new(Counter::default()));
        component.set_simulation_index(7).unwrap();
        assert_eq!(component.simulation_index(), 7);
        assert!(component.simulation().is_none());
    }
}
