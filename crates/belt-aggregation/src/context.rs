#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::ThreadPool;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use std::sync::Arc;
use std::sync::OnceLock;

static SHARED: OnceLock<ExecutionContext> = OnceLock::new();

/// Where aggregation partitions run.
///
/// A context either owns a rayon pool or runs everything on the calling thread. Pool creation
/// can fail under resource pressure (e.g. many test binaries running concurrently); the context
/// then falls back to sequential execution instead of panicking on first use.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    pool: Option<Arc<ThreadPool>>,
}

impl ExecutionContext {
    /// A context that never spawns work.
    pub fn sequential() -> Self {
        Self {
            #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
            pool: None,
        }
    }

    /// A context with a private pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Self {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            Self {
                pool: build_pool(threads.max(1)).map(Arc::new),
            }
        }
        #[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
        {
            let _ = threads;
            Self::sequential()
        }
    }

    /// Process-wide context sized from `RAYON_NUM_THREADS` or the available parallelism.
    pub fn shared() -> &'static ExecutionContext {
        SHARED.get_or_init(|| Self::with_threads(desired_threads()))
    }

    /// Number of threads partitions may run on.
    pub fn parallelism(&self) -> usize {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            if let Some(pool) = &self.pool {
                return pool.current_num_threads();
            }
        }
        1
    }

    /// Maps `f` over `items`, preserving order. Runs on the pool when there is more than one item
    /// and more than one thread.
    pub(crate) fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            if let Some(pool) = &self.pool {
                if items.len() > 1 && pool.current_num_threads() > 1 {
                    return pool.install(|| items.into_par_iter().map(f).collect());
                }
            }
        }
        items.into_iter().map(f).collect()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::shared().clone()
    }
}

fn desired_threads() -> usize {
    let from_env = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0);
    from_env.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn build_pool(requested: usize) -> Option<ThreadPool> {
    let try_build = |n| rayon::ThreadPoolBuilder::new().num_threads(n).build();

    match try_build(requested) {
        Ok(pool) => Some(pool),
        Err(err) if requested > 1 => {
            log::warn!("could not build a {requested}-thread pool ({err}); retrying with 1 thread");
            try_build(1).ok()
        }
        Err(err) => {
            log::warn!("could not build a thread pool ({err}); aggregating sequentially");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_context_maps_in_order() {
        let ctx = ExecutionContext::sequential();
        assert_eq!(ctx.parallelism(), 1);
        assert_eq!(ctx.map(vec![1, 2, 3], |x| x * 2), vec![2, 4, 6]);
    }

    #[test]
    fn pooled_context_preserves_order() {
        let ctx = ExecutionContext::with_threads(4);
        let out = ctx.map((0..100).collect(), |x: u32| x + 1);
        assert_eq!(out, (1..=100).collect::<Vec<_>>());
    }
}
