use crate::state::SimState;

/// Timing information for one model step
#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    /// Caller-measured elapsed time since the previous tick (s), unclamped
    pub dt: f64,
    /// Simulation time at the start of the tick (s)
    pub t: f64,
}

pub trait Model {
    fn reset(&mut self);
}

/// Pedal arbitration and other driver-facing control logic
pub trait ControlModel: Model {
    fn step_control(&mut self, ctx: SimContext, state: &mut SimState);
}

pub trait MechanicsModel: Model {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState);
}

pub trait ElectricalModel: Model {
    fn step_electrical(&mut self, ctx: SimContext, state: &mut SimState);
}
