//! Storage: reference-counted host buffer shared by tensor views

use crate::dtype::{DType, Element};
use std::sync::Arc;

/// Host memory for tensor data
///
/// The buffer is kept as `u64` words so any `Element` slice cast out of it is
/// aligned. Clones share the buffer; tensors never mutate storage after
/// construction, so sharing is safe across threads.
#[derive(Clone)]
pub(crate) struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    words: Vec<u64>,
    /// Number of elements (not bytes)
    len: usize,
    dtype: DType,
}

impl Storage {
    /// Copy `data` into a new buffer; the dtype comes from the element type.
    pub fn from_slice<T: Element>(data: &[T]) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);

        Self {
            inner: Arc::new(StorageInner {
                words,
                len: data.len(),
                dtype: T::DTYPE,
            }),
        }
    }

    /// Allocate `len` zero-initialized elements of `dtype`.
    pub fn zeroed(len: usize, dtype: DType) -> Self {
        let words = vec![0u64; (len * dtype.size_in_bytes()).div_ceil(8)];
        Self {
            inner: Arc::new(StorageInner { words, len, dtype }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Raw bytes of the live elements.
    pub fn bytes(&self) -> &[u8] {
        let nbytes = self.inner.len * self.inner.dtype.size_in_bytes();
        &bytemuck::cast_slice::<u64, u8>(&self.inner.words)[..nbytes]
    }

    /// Typed view, or `None` if `T` does not match the stored dtype.
    pub fn typed<T: Element>(&self) -> Option<&[T]> {
        if T::DTYPE != self.inner.dtype {
            return None;
        }
        Some(bytemuck::cast_slice(self.bytes()))
    }

    /// Whether two storages share one buffer.
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
