//! Customer actor.
//!
//! A customer arrives, queues for a cashier if none is free, is served for a
//! sampled duration and leaves. There is no reneging: a customer that is still
//! waiting when the horizon is reached simply never produces a record.

use checkout_core::SimError;
use tracing::info;

use crate::record::CustomerRecord;
use crate::store::StoreContext;

pub(crate) async fn customer(ctx: StoreContext, id: u64) -> Result<(), SimError> {
    let arrival_time = ctx.handle.now();
    ctx.log.record_arrival();
    info!(time = %arrival_time, "Customer {id} arrives at the store");

    let cashier = ctx.pool.acquire().await;
    let service_start = ctx.handle.now();
    info!(
        time = %service_start,
        "Customer {id} starts checkout (waited {:.2} minutes)",
        service_start - arrival_time
    );

    let service_time = ctx.sample_service_time();
    ctx.handle.timeout(service_time)?.await;
    cashier.release();

    let departure_time = ctx.handle.now();
    info!(time = %departure_time, "Customer {id} leaves the store");
    ctx.log
        .push_customer(CustomerRecord::new(id, arrival_time, service_start, departure_time));
    Ok(())
}
