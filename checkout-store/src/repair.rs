//! Repair actor.
//!
//! Takes one cashier out of service for the configured repair duration, then
//! puts back exactly what was taken. If the cashier is busy when the repair
//! starts, the pool removes the unit as soon as the customer there is done.
//! A repair that finds no open unit left to take ends at once and records
//! nothing.

use checkout_core::SimError;
use tracing::info;

use crate::record::RepairInterval;
use crate::store::StoreContext;

pub(crate) async fn repair(ctx: StoreContext, cashier_id: usize) -> Result<(), SimError> {
    let start_time = ctx.handle.now();
    let taken = ctx.pool.lower_capacity(1);
    if taken == 0 {
        info!(time = %start_time, "Cashier {cashier_id} has no open unit to repair");
        return Ok(());
    }
    info!(time = %start_time, "Cashier {cashier_id} is going into repair");

    ctx.handle.timeout(ctx.repair_duration)?.await;

    ctx.pool.raise_capacity(taken);
    let end_time = ctx.handle.now();
    info!(time = %end_time, "Cashier {cashier_id} has been repaired and is now available");
    ctx.log.push_repair(RepairInterval {
        cashier_id,
        start_time,
        end_time,
    });
    Ok(())
}
