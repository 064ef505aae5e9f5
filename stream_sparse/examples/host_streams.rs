// Runs a few sparse routines on several streams sharing one handle cache.
//
// RUST_LOG=trace cargo run --example host_streams --features log-lifetimes
use anyhow::Result;
use stream_sparse::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cache = HandleCache::new(HostLibrary::new());

    // [4 -1  0  0]
    // [-1 4 -1  0]
    // [0 -1  4 -1]
    // [0  0 -1  4]
    let dl = [0.0f64, -1.0, -1.0, -1.0];
    let d = [4.0f64; 4];
    let du = [-1.0f64, -1.0, -1.0, 0.0];
    let row_ptr = [0, 2, 5, 8, 10];
    let col_ind = [0, 1, 0, 1, 2, 1, 2, 3, 2, 3];
    let values = [4.0, -1.0, -1.0, 4.0, -1.0, -1.0, 4.0, -1.0, -1.0, 4.0];
    let a = CsrMatrix::new(4, 4, &row_ptr, &col_ind, &values);

    std::thread::scope(|s| -> Result<()> {
        let workers: Vec<_> = (0..4u64)
            .map(|worker| {
                let cache = &cache;
                let (dl, d, du, a) = (&dl, &d, &du, &a);
                s.spawn(move || -> Result<[f64; 4]> {
                    let mut context = SparseContext::new(cache, StreamId(worker % 2));
                    context.initialize()?;

                    let mut b = [worker as f64 + 1.0; 4];
                    let rhs = b;
                    context.gtsv_no_pivot(4, 1, dl, d, du, &mut b, 4)?;

                    // check the solution by multiplying it back
                    let mut residual = rhs;
                    context.csrmv(Operation::NonTranspose, 1.0, a, &b, -1.0, &mut residual)?;
                    tracing::info!(
                        "worker {} on {:?}: x = {:?}, residual = {:?}",
                        worker,
                        context.stream(),
                        b,
                        residual
                    );
                    Ok(b)
                })
            })
            .collect();
        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("worker panicked"))??;
        }
        Ok(())
    })?;

    let library = cache.library().clone();
    tracing::info!(
        "{} streams, {} handles created, {} routine calls",
        cache.len(),
        library.created(),
        library.calls().len()
    );
    drop(cache);
    tracing::info!("{} handles left after teardown", library.live());
    Ok(())
}
