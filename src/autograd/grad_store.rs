//! Gradient storage and accumulation

use super::Value;
use crate::error::Result;
use crate::sparse::SparseTensor;
use crate::tensor::{Tensor, TensorId};
use std::collections::HashMap;

/// Storage for gradients computed during backward pass
///
/// Gradients are stored by variable ID and accumulated when a variable
/// is used multiple times in the computation graph.
#[derive(Debug, Default)]
pub struct GradStore {
    grads: HashMap<TensorId, Value>,
}

impl GradStore {
    /// Create a new empty gradient store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the gradient for a variable
    pub fn get(&self, id: TensorId) -> Option<&Value> {
        self.grads.get(&id)
    }

    /// Get a dense gradient
    pub fn get_dense(&self, id: TensorId) -> Option<&Tensor> {
        self.get(id).and_then(Value::as_dense)
    }

    /// Get a sparse gradient
    pub fn get_sparse(&self, id: TensorId) -> Option<&SparseTensor> {
        self.get(id).and_then(Value::as_sparse)
    }

    /// Insert a gradient (overwrites if exists)
    pub fn insert(&mut self, id: TensorId, grad: Value) {
        self.grads.insert(id, grad);
    }

    /// Check if a gradient exists
    pub fn contains(&self, id: TensorId) -> bool {
        self.grads.contains_key(&id)
    }

    /// Remove and return a gradient
    pub fn remove(&mut self, id: TensorId) -> Option<Value> {
        self.grads.remove(&id)
    }

    /// Number of stored gradients
    pub fn len(&self) -> usize {
        self.grads.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    /// Accumulate a gradient for a variable
    ///
    /// Stores `grad` if none exists yet; otherwise replaces the existing
    /// gradient with the sum. Dense gradients must agree in shape and sparse
    /// gradients in pattern.
    pub fn accumulate(&mut self, id: TensorId, grad: Value) -> Result<()> {
        match self.grads.get_mut(&id) {
            Some(existing) => *existing = existing.add(&grad)?,
            None => {
                self.grads.insert(id, grad);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_dense() {
        let mut store = GradStore::new();
        let id = TensorId::new();

        store
            .accumulate(id, Tensor::from_slice(&[1.0f64, 2.0], &[2]).into())
            .unwrap();
        store
            .accumulate(id, Tensor::from_slice(&[0.5f64, 0.5], &[2]).into())
            .unwrap();

        assert_eq!(store.get_dense(id).unwrap().to_vec::<f64>(), vec![1.5, 2.5]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_accumulate_sparse_requires_same_pattern() {
        let mut store = GradStore::new();
        let id = TensorId::new();
        let a = SparseTensor::from_slices(&[0, 0, 0, 0, 0, 1], &[1.0, 2.0], &[1, 2, 2]).unwrap();
        let b = SparseTensor::from_slices(&[0, 0, 1, 0, 0, 1], &[1.0, 2.0], &[1, 2, 2]).unwrap();

        store.accumulate(id, a.clone().into()).unwrap();
        store.accumulate(id, a.into()).unwrap();
        assert_eq!(
            store.get_sparse(id).unwrap().values().to_vec::<f64>(),
            vec![2.0, 4.0]
        );

        assert!(store.accumulate(id, b.into()).is_err());
    }
}
