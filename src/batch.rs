//! Buffer for accumulating decoded ports into fixed-size batches.

use crate::domain::{Port, Ports};

/// Accumulates ports and hands off a full batch exactly at capacity.
///
/// The buffer is owned and mutated by the pipeline driver only; a handed-off
/// batch is a fresh `Vec` the caller may move into a delivery task.
pub struct BatchBuffer {
    buf: Ports,
    batch_size: usize,
}

impl BatchBuffer {
    /// Create a new batch buffer emitting batches of `batch_size` ports.
    pub fn new(batch_size: usize) -> Self {
        Self {
            buf: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    /// Append one port, handing back a full batch once capacity is reached.
    pub fn push(&mut self, port: Port) -> Option<Ports> {
        self.buf.push(port);

        if self.buf.len() == self.batch_size {
            let batch = std::mem::replace(&mut self.buf, Vec::with_capacity(self.batch_size));
            return Some(batch);
        }

        None
    }

    /// Hand back whatever is buffered at end of input; this final batch may
    /// be smaller than the configured size.
    pub fn finish(&mut self) -> Option<Ports> {
        if self.buf.is_empty() {
            return None;
        }

        Some(std::mem::take(&mut self.buf))
    }

    /// Get the current number of buffered ports.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod batch_spec {
    use super::BatchBuffer;
    use crate::domain::Port;

    fn port(id: &str) -> Port {
        Port {
            id: id.into(),
            ..Port::default()
        }
    }

    #[test]
    fn emits_exactly_at_capacity() {
        let mut buffer = BatchBuffer::new(2);

        assert!(buffer.push(port("A")).is_none());
        assert_eq!(1, buffer.len());

        let batch = buffer.push(port("B")).unwrap();
        assert_eq!(vec!["A", "B"], batch.iter().map(|p| p.id.as_str()).collect::<Vec<_>>());
        assert!(buffer.is_empty());
    }

    #[test]
    fn finish_hands_back_the_partial_remainder() {
        let mut buffer = BatchBuffer::new(3);
        buffer.push(port("A"));
        buffer.push(port("B"));

        let last = buffer.finish().unwrap();
        assert_eq!(2, last.len());
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn finish_on_empty_buffer_is_none() {
        let mut buffer = BatchBuffer::new(3);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn batch_count_and_sizes_add_up() {
        let mut buffer = BatchBuffer::new(2);
        let mut batches = Vec::new();

        for i in 0..5 {
            if let Some(batch) = buffer.push(port(&format!("P{i}"))) {
                batches.push(batch);
            }
        }
        if let Some(batch) = buffer.finish() {
            batches.push(batch);
        }

        // 5 ports with batch size 2 -> ceil(5/2) batches, sizes summing to 5,
        // only the final one under capacity
        assert_eq!(3, batches.len());
        assert_eq!(5, batches.iter().map(Vec::len).sum::<usize>());
        assert_eq!(vec![2, 2, 1], batches.iter().map(Vec::len).collect::<Vec<_>>());
    }
}
