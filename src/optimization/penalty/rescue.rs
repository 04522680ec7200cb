//! Memo of model evaluations at rescue points.
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::types::{Grad, Theta},
};

/// Rescue points remembered per session.
///
/// Solvers evaluate the cost and then the gradient at the same iterate, and
/// a model whose violated axes cover every parameter always maps to one
/// rescue point. A short window catches both repeats while keeping the
/// memory of a long run constant.
pub const RESCUE_CACHE_CAPACITY: usize = 4;

#[derive(Debug, Clone)]
struct Entry {
    key: Vec<u64>,
    cost: f64,
    grad: Option<Grad>,
}

/// Model cost (and, on demand, gradient) at recent rescue points for one
/// estimation session.
///
/// Keyed by the exact bit pattern of the rescue point. At most
/// [`RESCUE_CACHE_CAPACITY`] entries are kept; the oldest is evicted first.
/// Owned by a single [`Guarded`](super::Guarded); never shared.
#[derive(Debug, Default)]
pub struct RescueCache {
    entries: RefCell<VecDeque<Entry>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

fn key_of(point: &Theta) -> Vec<u64> {
    point.iter().map(|v| v.to_bits()).collect()
}

impl RescueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached cost at `point`, computing and storing it on a miss.
    ///
    /// Errors from `compute` are returned and nothing is stored.
    pub fn cost_or_try_insert<F>(&self, point: &Theta, compute: F) -> OptResult<f64>
    where
        F: FnOnce() -> OptResult<f64>,
    {
        let key = key_of(point);
        let hit = self.entries.borrow().iter().find(|e| e.key == key).map(|e| e.cost);
        if let Some(cost) = hit {
            self.hits.set(self.hits.get() + 1);
            return Ok(cost);
        }
        let cost = compute()?;
        self.misses.set(self.misses.get() + 1);
        let mut entries = self.entries.borrow_mut();
        if entries.len() == RESCUE_CACHE_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(Entry { key, cost, grad: None });
        Ok(cost)
    }

    /// Cached gradient at `point`, computing it on a miss.
    ///
    /// The gradient is stored only alongside a cost entry for the same
    /// point; `compute` may itself evaluate through the cache.
    pub fn gradient_or_try_insert<F>(&self, point: &Theta, compute: F) -> OptResult<Grad>
    where
        F: FnOnce() -> OptResult<Grad>,
    {
        let key = key_of(point);
        let hit =
            self.entries.borrow().iter().find(|e| e.key == key).and_then(|e| e.grad.clone());
        if let Some(grad) = hit {
            self.hits.set(self.hits.get() + 1);
            return Ok(grad);
        }
        let grad = compute()?;
        self.misses.set(self.misses.get() + 1);
        if let Some(entry) = self.entries.borrow_mut().iter_mut().find(|e| e.key == key) {
            entry.grad = Some(grad.clone());
        }
        Ok(grad)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Lookups that had to evaluate the model.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::array;

    #[test]
    fn computes_once_per_point() {
        let cache = RescueCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(7.5)
        };

        assert_eq!(cache.cost_or_try_insert(&array![1.0, 2.0], compute), Ok(7.5));
        assert_eq!(cache.cost_or_try_insert(&array![1.0, 2.0], compute), Ok(7.5));
        assert_eq!(cache.cost_or_try_insert(&array![1.0, 2.5], compute), Ok(7.5));

        assert_eq!(calls.get(), 2);
        assert_eq!((cache.hits(), cache.misses()), (1, 2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // A long sequence of distinct rescue points must not grow the cache.
    //
    // Given
    // -----
    // - 1000 distinct points, each looked up twice in a row (cost, then
    //   cost again as a gradient request would).
    //
    // Expect
    // ------
    // - Size capped at the capacity; every second lookup is a hit.
    fn size_stays_bounded_over_many_points() {
        let cache = RescueCache::new();

        for i in 0..1000 {
            let p = array![1.0, i as f64];
            cache.cost_or_try_insert(&p, || Ok(i as f64)).unwrap();
            assert_eq!(cache.cost_or_try_insert(&p, || Ok(-1.0)), Ok(i as f64));
        }

        assert_eq!(cache.len(), RESCUE_CACHE_CAPACITY);
        assert_eq!((cache.hits(), cache.misses()), (1000, 1000));
    }

    #[test]
    fn gradient_is_stored_next_to_its_cost() {
        let cache = RescueCache::new();
        let p = array![2.0];
        cache.cost_or_try_insert(&p, || Ok(3.0)).unwrap();

        let first = cache.gradient_or_try_insert(&p, || Ok(array![0.5])).unwrap();
        let second = cache.gradient_or_try_insert(&p, || Ok(array![9.0])).unwrap();

        assert_eq!(first, array![0.5]);
        assert_eq!(second, array![0.5]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_computation_is_not_cached() {
        let cache = RescueCache::new();

        let err = cache.cost_or_try_insert(&array![1.0], || Err(OptError::EmptyData));

        assert_eq!(err, Err(OptError::EmptyData));
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 0);
    }
}
