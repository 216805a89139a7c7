#![forbid(unsafe_code)]

use crate::model::Operation;

/// Circular growable FIFO of pending operations. When full, `enqueue`
/// doubles the capacity and linearizes the ring back to index 0.
#[derive(Debug)]
pub struct OpQueue {
    data: Vec<Option<Operation>>,
    start: usize,
    end: usize,
    size: usize,
}

impl OpQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, || None);
        Self { data, start: 0, end: 0, size: 0 }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn enqueue(&mut self, op: Operation) {
        if self.size == self.data.len() {
            let old_cap = self.data.len();
            let mut grown: Vec<Option<Operation>> = Vec::with_capacity(old_cap * 2);
            for i in 0..self.size {
                grown.push(self.data[(self.start + i) % old_cap].take());
            }
            grown.resize_with(old_cap * 2, || None);
            self.data = grown;
            self.start = 0;
            self.end = self.size;
        }
        self.data[self.end] = Some(op);
        self.end = (self.end + 1) % self.data.len();
        self.size += 1;
    }

    pub fn dequeue(&mut self) -> Option<Operation> {
        if self.size == 0 {
            return None;
        }
        let op = self.data[self.start].take();
        debug_assert!(op.is_some(), "occupied slot at queue start");
        self.start = (self.start + 1) % self.data.len();
        self.size -= 1;
        op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpKind;
    use crate::text::Text;

    fn op(name: &str) -> Operation {
        Operation {
            kind: OpKind::Copy,
            is_dir: false,
            name: Text::from(name),
            source_dir: Text::from("/a"),
            dest_dir: None,
        }
    }

    #[test]
    fn fifo_order_and_size() {
        let mut q = OpQueue::new(5);
        q.enqueue(op("f.txt"));
        q.enqueue(op("g.txt"));
        assert_eq!(q.len(), 2);
        assert_eq!(q.dequeue().unwrap().name, Text::from("f.txt"));
        assert_eq!(q.len(), 1);
        assert_eq!(q.dequeue().unwrap().name, Text::from("g.txt"));
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn empty_dequeue_is_none() {
        let mut q = OpQueue::new(3);
        assert!(q.is_empty());
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn wraparound_matches_linear_enqueue() {
        // Drive start/end around the ring, then compare against a queue that
        // only ever saw the surviving items.
        let mut wrapped = OpQueue::new(4);
        for name in ["a", "b", "c"] {
            wrapped.enqueue(op(name));
        }
        wrapped.dequeue();
        wrapped.dequeue();
        for name in ["d", "e", "f"] {
            wrapped.enqueue(op(name));
        }

        let mut linear = OpQueue::new(4);
        for name in ["c", "d", "e", "f"] {
            linear.enqueue(op(name));
        }

        assert_eq!(wrapped.len(), linear.len());
        loop {
            match (wrapped.dequeue(), linear.dequeue()) {
                (Some(a), Some(b)) => assert_eq!(a.name, b.name),
                (None, None) => break,
                _ => panic!("queues drained unevenly"),
            }
        }
    }

    #[test]
    fn growth_linearizes_and_keeps_order() {
        let mut q = OpQueue::new(2);
        q.enqueue(op("a"));
        q.enqueue(op("b"));
        q.dequeue();
        q.enqueue(op("c"));
        // Full with start mid-ring; the next enqueue doubles and linearizes.
        q.enqueue(op("d"));
        assert_eq!(q.capacity(), 4);
        let drained: Vec<String> = std::iter::from_fn(|| q.dequeue())
            .map(|o| o.name.to_string())
            .collect();
        assert_eq!(drained, ["b", "c", "d"]);
    }
}
