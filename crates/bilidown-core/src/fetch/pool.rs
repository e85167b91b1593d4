//! Reusable payload buffers.
//!
//! Fetchers take a buffer per fragment; the sequencer gives it back after the
//! payload has been written. At most `capacity` idle buffers are retained.

use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    buffer_len: usize,
}

impl BufferPool {
    /// Pool keeping up to `capacity` idle buffers sized for `buffer_len` bytes.
    pub fn new(capacity: usize, buffer_len: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            buffer_len,
        }
    }

    /// An empty buffer with room for one fragment.
    pub fn acquire(&self) -> Vec<u8> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match reused {
            Some(mut buf) => {
                buf.clear();
                buf
            }
            None => Vec::with_capacity(self.buffer_len),
        }
    }

    /// Return a buffer once its payload has been consumed.
    pub fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.capacity {
            idle.push(buf);
        }
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_buffers_are_reused_cleared() {
        let pool = BufferPool::new(2, 16);
        let mut a = pool.acquire();
        assert!(a.capacity() >= 16);
        a.extend_from_slice(b"payload");
        let ptr = a.as_ptr();
        pool.release(a);
        assert_eq!(pool.idle(), 1);
        let b = pool.acquire();
        assert!(b.is_empty());
        assert_eq!(b.as_ptr(), ptr);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn pool_caps_idle_buffers() {
        let pool = BufferPool::new(1, 4);
        pool.release(vec![1, 2, 3]);
        pool.release(vec![4, 5, 6]);
        assert_eq!(pool.idle(), 1);
    }
}
