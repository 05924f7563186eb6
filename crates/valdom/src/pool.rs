//! Reusable scratch buffers with scoped leases.

use alloc::{rc::Rc, vec::Vec};
use core::{
    cell::RefCell,
    ops::{Deref, DerefMut},
};

/// A pool of reusable byte buffers.
///
/// The pool may be shared sequentially between parser instances; it carries
/// no synchronization, so concurrent use from multiple threads requires
/// external locking (it is not `Sync`).
#[derive(Debug, Default)]
pub struct BufferPool {
    idle: RefCell<Vec<Vec<u8>>>,
}

impl BufferPool {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Leases a cleared buffer with at least `capacity` bytes of storage.
    ///
    /// The storage returns to the pool when the lease is dropped.
    #[must_use]
    pub fn lease(self: &Rc<Self>, capacity: usize) -> PooledBuf {
        let mut buf = self.idle.borrow_mut().pop().unwrap_or_default();
        buf.clear();
        buf.reserve(capacity);
        PooledBuf {
            buf,
            pool: Rc::clone(self),
        }
    }

    #[must_use]
    pub fn idle_buffers(&self) -> usize {
        self.idle.borrow().len()
    }
}

/// A leased buffer; dereferences to `Vec<u8>`.
#[derive(Debug)]
pub struct PooledBuf {
    buf: Vec<u8>,
    pool: Rc<BufferPool>,
}

impl Deref for PooledBuf {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        let buf = core::mem::take(&mut self.buf);
        self.pool.idle.borrow_mut().push(buf);
    }
}
