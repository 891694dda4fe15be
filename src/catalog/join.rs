use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Merge several sorted iterators into one sorted stream, dropping
/// duplicates that appear in more than one source
pub struct MergeJoin<I>
where
    I: Iterator,
    I::Item: Ord + Clone,
{
    sources: Vec<I>,
    heap: BinaryHeap<Reverse<(I::Item, usize)>>,
    last: Option<I::Item>,
}

impl<I> MergeJoin<I>
where
    I: Iterator,
    I::Item: Ord + Clone,
{
    pub fn new(sources: impl IntoIterator<Item = I>) -> Self {
        let mut sources: Vec<I> = sources.into_iter().collect();
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (index, source) in sources.iter_mut().enumerate() {
            if let Some(item) = source.next() {
                heap.push(Reverse((item, index)));
            }
        }
        Self {
            sources,
            heap,
            last: None,
        }
    }
}

impl<I> Iterator for MergeJoin<I>
where
    I: Iterator,
    I::Item: Ord + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Reverse((item, index))) = self.heap.pop() {
            if let Some(next) = self.sources[index].next() {
                self.heap.push(Reverse((next, index)));
            }
            if self.last.as_ref() == Some(&item) {
                continue;
            }
            self.last = Some(item.clone());
            return Some(item);
        }
        None
    }
}
