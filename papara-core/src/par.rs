/// Parallel map: apply `$f` to each element of `$slice`, collecting into a Vec.
macro_rules! par_map {
    ($slice:expr, $f:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
            $slice.par_iter().map($f).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter().map($f).collect()
        }
    }};
}

/// Runs `$body` inside a worker pool of `$threads` threads.
///
/// Without the `parallel` feature the body runs on the calling thread.
macro_rules! with_workers {
    ($threads:expr, $body:expr) => {{
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(($threads).max(1))
                .build()
                .map_err(|e| $crate::error::PaparaError::ThreadPool(e.to_string()))?;
            pool.install($body)
        }
        #[cfg(not(feature = "parallel"))]
        {
            let _ = $threads;
            ($body)()
        }
    }};
}
