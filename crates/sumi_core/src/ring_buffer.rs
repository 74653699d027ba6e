//! Fixed-capacity ring buffer
//!
//! Holds the most recent `capacity` elements; pushing past capacity
//! overwrites the oldest. Iteration and indexing run oldest to newest.
//! The brush uses this as its sliding control-point window.

#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    contents: Vec<T>,
    capacity: usize,
    head: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            contents: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an element, overwriting the oldest one when full.
    pub fn push(&mut self, element: T) {
        if self.contents.len() < self.capacity {
            self.contents.push(element);
        } else {
            self.contents[self.head] = element;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn clear(&mut self) {
        self.contents.clear();
        self.head = 0;
    }

    /// Element at logical position `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.contents.len() {
            Some(&self.contents[(self.head + index) % self.capacity])
        } else {
            None
        }
    }

    /// The newest element.
    pub fn last(&self) -> Option<&T> {
        match self.contents.len() {
            0 => None,
            n => self.get(n - 1),
        }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.contents.len()).filter_map(move |i| self.get(i))
    }
}

impl<T> std::ops::Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("ring buffer index out of range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(buffer: &RingBuffer<i32>) -> Vec<i32> {
        buffer.iter().copied().collect()
    }

    #[test]
    fn test_push() {
        let mut buffer = RingBuffer::new(3);

        buffer.push(0);
        assert_eq!(vec![0], collect(&buffer));

        buffer.push(1);
        assert_eq!(vec![0, 1], collect(&buffer));

        buffer.push(2);
        assert_eq!(vec![0, 1, 2], collect(&buffer));

        buffer.push(3);
        assert_eq!(vec![1, 2, 3], collect(&buffer));
    }

    #[test]
    fn test_push_many() {
        let mut buffer = RingBuffer::new(3);
        for element in 0..10 {
            buffer.push(element);
        }
        assert_eq!(vec![7, 8, 9], collect(&buffer));
    }

    #[test]
    fn test_clear() {
        let mut buffer = RingBuffer::new(3);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(Vec::<i32>::new(), collect(&buffer));
    }

    #[test]
    fn test_len() {
        let mut buffer = RingBuffer::new(3);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(2, buffer.len());

        buffer.push(3);
        buffer.push(4);
        assert_eq!(3, buffer.len());
    }

    #[test]
    fn test_index() {
        let mut buffer = RingBuffer::new(3);
        buffer.push(0);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);

        assert_eq!(1, buffer[0]);
        assert_eq!(2, buffer[1]);
        assert_eq!(3, buffer[2]);
        assert_eq!(Some(&3), buffer.last());
    }
}
