//! Reusable color buffer for span generators.

/// Grows in steps of 256 elements and never shrinks, so steady-state
/// rendering does not allocate.
#[derive(Debug, Clone)]
pub struct SpanAllocator<C> {
    span: Vec<C>,
}

impl<C: Copy + Default> SpanAllocator<C> {
    pub fn new() -> Self {
        Self { span: Vec::new() }
    }

    /// A slice of exactly `len` elements; contents are whatever the previous
    /// span left behind.
    pub fn allocate(&mut self, len: usize) -> &mut [C] {
        if len > self.span.len() {
            self.span.resize((len + 255) & !255, C::default());
        }
        &mut self.span[..len]
    }

    pub fn capacity(&self) -> usize {
        self.span.len()
    }
}

impl<C: Copy + Default> Default for SpanAllocator<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        assert_eq!(SpanAllocator::<u8>::new().capacity(), 0);
    }

    #[test]
    fn test_grows_in_blocks_of_256() {
        let mut alloc = SpanAllocator::<u32>::new();
        assert_eq!(alloc.allocate(10).len(), 10);
        assert_eq!(alloc.capacity(), 256);
        alloc.allocate(257);
        assert_eq!(alloc.capacity(), 512);
    }

    #[test]
    fn test_smaller_request_reuses_buffer() {
        let mut alloc = SpanAllocator::<u32>::new();
        alloc.allocate(100)[0] = 7;
        let span = alloc.allocate(50);
        assert_eq!(span.len(), 50);
        assert_eq!(span[0], 7);
        assert_eq!(alloc.capacity(), 256);
    }
}
