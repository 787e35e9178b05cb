//! # RedLilium Physics
//!
//! Lifecycle glue between objects and the simulations that update them.
//!
//! - [`Simulation`]: Ordered set of participants driven by [`Simulation::step`]
//! - [`SimulationSet`]: Indexed simulations an object can pick from
//! - [`SimulationUpdate`]: Per-step callbacks a participant implements
//! - [`SimulationUpdateComponent`]: Registers a participant with the simulation
//!   selected by its index while started
//!
//! The integration step itself lives elsewhere; [`Simulation::step`] only
//! dispatches the update callbacks.

mod component;
mod error;
mod simulation;

pub use component::SimulationUpdateComponent;
pub use error::PhysicsError;
pub use simulation::{ParticipantId, Simulation, SimulationSet, SimulationUpdate};
