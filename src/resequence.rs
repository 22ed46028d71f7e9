use std::collections::btree_map::{BTreeMap, Entry};

use crate::JobResult;

/// Restores sequence-number order over a stream of results.
///
/// With more than one worker a pool delivers results in completion order.
/// `Resequence` holds back early arrivals until every lower sequence number
/// has been yielded. Results without a sequence number, or whose number was
/// already passed or is duplicated, are yielded as soon as they arrive.
///
/// If the source ends while numbers are still missing, the held-back
/// results are yielded in ascending order.
pub struct Resequence<I, R> {
    inner: I,
    // `None` once `u64::MAX` has been yielded.
    next_seq: Option<u64>,
    pending: BTreeMap<u64, JobResult<R>>,
    exhausted: bool,
}

impl<I, R> Resequence<I, R>
where
    I: Iterator<Item = JobResult<R>>,
{
    /// Resequences `inner` starting from sequence number 0.
    pub fn new(inner: I) -> Self {
        Self::starting_at(inner, 0)
    }

    /// Resequences `inner` starting from `first`.
    pub fn starting_at(inner: I, first: u64) -> Self {
        Resequence {
            inner,
            next_seq: Some(first),
            pending: BTreeMap::new(),
            exhausted: false,
        }
    }

    /// Number of results currently held back.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<I, R> Iterator for Resequence<I, R>
where
    I: Iterator<Item = JobResult<R>>,
{
    type Item = JobResult<R>;

    fn next(&mut self) -> Option<JobResult<R>> {
        loop {
            if let Some(next) = self.next_seq {
                if let Some(result) = self.pending.remove(&next) {
                    self.next_seq = next.checked_add(1);
                    return Some(result);
                }
            }
            if self.exhausted {
                let (seq, result) = self.pending.pop_first()?;
                self.next_seq = seq.checked_add(1);
                return Some(result);
            }
            let Some(result) = self.inner.next() else {
                self.exhausted = true;
                continue;
            };
            let seq = match (result.seq(), self.next_seq) {
                (Some(seq), Some(next)) if seq > next => seq,
                (Some(seq), Some(next)) if seq == next => {
                    self.next_seq = seq.checked_add(1);
                    return Some(result);
                }
                _ => return Some(result),
            };
            match self.pending.entry(seq) {
                Entry::Vacant(slot) => {
                    slot.insert(result);
                }
                Entry::Occupied(_) => return Some(result),
            }
        }
    }
}
