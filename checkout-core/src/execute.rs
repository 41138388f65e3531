use crate::{SimError, SimTime, Simulation};

/// Simulation execution trait.
pub trait Execute {
    /// Executes the simulation until some stopping condition is reached.
    /// The condition is implementation-specific.
    ///
    /// # Errors
    ///
    /// Stops at the first actor that completes with an error and returns it.
    fn execute(self, sim: &mut Simulation) -> Result<(), SimError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    NoEvents,
    Steps(usize),
}

/// Executor is used for simple execution of an entire simulation.
///
/// See the crate level documentation for examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Simulation will end only once there is no available events in the queue.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            end_condition: EndCondition::NoEvents,
        }
    }

    /// Simulation will process every event due at or before the given time.
    /// It may terminate early if no events are available.
    ///
    /// The clock is left at the last processed event, not moved to `time`.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self {
            end_condition: EndCondition::Time(time),
        }
    }

    /// Simulation will execute exactly this many steps, unless we run out of events.
    #[must_use]
    pub fn steps(steps: usize) -> Self {
        Self {
            end_condition: EndCondition::Steps(steps),
        }
    }

    /// Registers a side effect that is called _after_ each simulation step.
    #[must_use]
    pub fn side_effect<F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        F: FnMut(&Simulation),
    {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl Execute for Executor {
    fn execute(self, sim: &mut Simulation) -> Result<(), SimError> {
        run_with(sim, self.end_condition, |_| {})
    }
}

pub struct ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    end_condition: EndCondition,
    side_effect: F,
}

impl<F> Execute for ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    fn execute(self, sim: &mut Simulation) -> Result<(), SimError> {
        run_with(sim, self.end_condition, self.side_effect)
    }
}

fn run_with<F>(
    sim: &mut Simulation,
    end_condition: EndCondition,
    mut side_effect: F,
) -> Result<(), SimError>
where
    F: FnMut(&Simulation),
{
    let mut step_fn = |sim: &mut Simulation| -> Result<bool, SimError> {
        let processed = sim.step()?;
        if processed {
            side_effect(sim);
        }
        Ok(processed)
    };
    match end_condition {
        EndCondition::Time(time) => execute_until(sim, time, &mut step_fn),
        EndCondition::NoEvents => execute_until_empty(sim, &mut step_fn),
        EndCondition::Steps(steps) => execute_steps(sim, steps, &mut step_fn),
    }
}

fn execute_until_empty<F>(sim: &mut Simulation, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    while step(sim)? {}
    Ok(())
}

fn execute_until<F>(sim: &mut Simulation, time: SimTime, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    while sim.peek_next_event_time().is_some_and(|next| next <= time) {
        step(sim)?;
    }
    Ok(())
}

fn execute_steps<F>(sim: &mut Simulation, steps: usize, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    for _ in 0..steps {
        if !step(sim)? {
            break;
        }
    }
    Ok(())
}
