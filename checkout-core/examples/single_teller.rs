//! A single teller serving a fixed list of customers, printed step by step.

use checkout_core::{init_simulation_logging_with_level, ResourcePool, SimTime, Simulation};

fn main() -> Result<(), checkout_core::SimError> {
    init_simulation_logging_with_level("debug");

    let mut sim = Simulation::default();
    let teller = ResourcePool::new(&sim.handle(), 1, 1)?;

    for (name, arrival, service) in [("ann", 0.0, 4.0), ("bob", 1.0, 2.0), ("cai", 1.5, 3.0)] {
        let (handle, teller) = (sim.handle(), teller.clone());
        sim.spawn(async move {
            handle.timeout(arrival)?.await;
            let permit = teller.acquire().await;
            println!("{:>6.2}  {name} at the counter", handle.now().as_minutes());
            handle.timeout(service)?.await;
            permit.release();
            println!("{:>6.2}  {name} done", handle.now().as_minutes());
            Ok(())
        });
    }

    sim.run_until(SimTime::from_minutes(60.0)?)
}
