use core::fmt;

/// The virtual machine's data stack.
///
/// A LIFO with a maximum size that is only enforced in debug builds, so a
/// runaway program is caught during development without costing a branch per
/// push in release builds.
///
/// # Examples
///
/// ```
/// use quadgl_core::vm::Stack;
///
/// let mut stack = Stack::new(16);
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.peek(), Some(&1));
/// ```
pub struct Stack<T> {
    items: Vec<T>,
    max_size: usize,
}

impl<T> Stack<T> {
    /// Creates an empty stack that may hold up to `max_size` elements.
    pub fn new(max_size: usize) -> Self {
        // Pre-allocate a reasonable amount to avoid early reallocations.
        let initial_capacity = max_size.min(256);

        Self {
            items: Vec::with_capacity(initial_capacity),
            max_size,
        }
    }

    /// Pushes a value onto the stack.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the stack is already at its maximum size.
    #[inline]
    pub fn push(&mut self, value: T) {
        debug_assert!(
            self.items.len() < self.max_size,
            "Stack overflow: attempted to push beyond maximum size of {}",
            self.max_size
        );
        self.items.push(value);
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the element `offset` slots below the top (`0` is the top).
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<&T> {
        let len = self.items.len();
        if offset >= len {
            None
        } else {
            Some(&self.items[len - 1 - offset])
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of elements (enforced in debug builds only).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drops the top `n` elements; drops everything if `n` exceeds the depth.
    #[inline]
    pub fn pop_n(&mut self, n: usize) {
        let new_len = self.len().saturating_sub(n);
        self.items.truncate(new_len);
    }

    /// Iterates from bottom to top.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The top `n` elements ordered bottom to top (`slice[n - 1]` is the top),
    /// or `None` if fewer than `n` are present.
    #[inline]
    pub fn top_n(&self, n: usize) -> Option<&[T]> {
        let len = self.items.len();
        if n > len {
            None
        } else {
            Some(&self.items[len - n..])
        }
    }

    /// Removes the top `n` elements and yields them bottom to top, which is
    /// the order they were pushed in.
    ///
    /// Returns `None` and leaves the stack untouched if fewer than `n` are
    /// present.
    #[inline]
    pub fn drain_top(&mut self, n: usize) -> Option<impl Iterator<Item = T> + '_> {
        let len = self.items.len();
        if n > len {
            None
        } else {
            Some(self.items.drain(len - n..))
        }
    }

    /// The whole stack, bottom first.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: fmt::Debug> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("items", &self.items)
            .field("len", &self.items.len())
            .field("capacity", &self.max_size)
            .finish()
    }
}

impl<T> core::ops::Index<usize> for Stack<T> {
    type Output = T;

    /// Indexes from the top: `stack[0]` is the top element.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        let len = self.items.len();
        assert!(
            index < len,
            "Stack index out of bounds: index {} but stack has {} elements",
            index,
            len
        );
        &self.items[len - 1 - index]
    }
}
