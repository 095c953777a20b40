//! Sweep-line merge of several range streams.
//!
//! Every input is a stream of `(Range, T)` sorted by begin address, with no
//! two ranges of the same input overlapping. The merge turns each range into
//! a begin edge at `begin` and an end edge at `end + 1`, k-way merges all
//! edges by `(position, begin-before-end, source)`, and walks them grouped by
//! position. Between two consecutive positions the set of open ranges is
//! constant; whenever that set is non-empty it is emitted as one
//! [`MergedInterval`].
//!
//! ```text
//! position   0    5    10   15   20
//! source 0   [----a----]
//! source 1        [----b----]
//! source 2                       c
//! merged     [a ][a,b ][b  ]     [c]
//! ```
//!
//! Edge positions are `u64`, so `end + 1` cannot overflow for the last
//! address of the space.

use crate::error::{CoreError, CoreResult};
use crate::record::Range;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::iter::Peekable;
use whip_codec::Address;

/// A maximal interval over which the same set of input ranges is open.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedInterval<T> {
    range: Range,
    active: Vec<T>,
}

impl<T> MergedInterval<T> {
    /// The covered addresses.
    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    /// First covered address.
    #[must_use]
    pub fn begin(&self) -> Address {
        self.range.begin()
    }

    /// Last covered address.
    #[must_use]
    pub fn end(&self) -> Address {
        self.range.end()
    }

    /// Data of every open range, ordered by source index.
    #[must_use]
    pub fn active(&self) -> &[T] {
        &self.active
    }

    /// Splits the interval into its range and active data.
    pub fn into_parts(self) -> (Range, Vec<T>) {
        (self.range, self.active)
    }
}

/// Merges sorted, internally non-overlapping range streams.
///
/// With exactly one input every range is passed through unchanged as a
/// single-element interval: adjacent or duplicate ranges are not squashed and
/// nothing is checked. With two or more inputs the sweep described in the
/// module docs runs, and malformed input surfaces as
/// [`CoreError::CorruptMergeInput`].
pub fn merge_ranges<'a, T, I>(inputs: impl IntoIterator<Item = I>) -> MergeRanges<'a, T>
where
    T: Clone + 'a,
    I: IntoIterator<Item = (Range, T)>,
    I::IntoIter: 'a,
{
    try_merge_ranges(
        inputs
            .into_iter()
            .map(|input| input.into_iter().map(Ok::<(Range, T), CoreError>)),
    )
}

/// Like [`merge_ranges`], for inputs that can fail while being read.
///
/// The first input error is yielded as the next item and ends the merge.
pub fn try_merge_ranges<'a, T, I>(inputs: impl IntoIterator<Item = I>) -> MergeRanges<'a, T>
where
    T: Clone + 'a,
    I: IntoIterator<Item = CoreResult<(Range, T)>>,
    I::IntoIter: 'a,
{
    let mut inputs: Vec<I::IntoIter> = inputs.into_iter().map(IntoIterator::into_iter).collect();

    if inputs.len() == 1 {
        if let Some(only) = inputs.pop() {
            let passthrough = only.map(|item| {
                item.map(|(range, data)| MergedInterval {
                    range,
                    active: vec![data],
                })
            });
            return MergeRanges {
                inner: Inner::Single(Box::new(passthrough)),
            };
        }
    }

    let streams = inputs
        .into_iter()
        .enumerate()
        .map(|(source, input)| edges(source, input));
    let events: EventStream<'a, T> = Box::new(streams.kmerge_by(event_less::<T>));

    MergeRanges {
        inner: Inner::Sweep(Sweep {
            events: events.peekable(),
            active: BTreeMap::new(),
            previous: None,
            done: false,
        }),
    }
}

/// Lazy iterator returned by [`merge_ranges`].
pub struct MergeRanges<'a, T> {
    inner: Inner<'a, T>,
}

enum Inner<'a, T> {
    Single(Box<dyn Iterator<Item = CoreResult<MergedInterval<T>>> + 'a>),
    Sweep(Sweep<'a, T>),
}

impl<T: Clone> Iterator for MergeRanges<'_, T> {
    type Item = CoreResult<MergedInterval<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Single(passthrough) => passthrough.next(),
            Inner::Sweep(sweep) => sweep.next(),
        }
    }
}

#[derive(Debug)]
enum Edge<T> {
    Begin(T),
    End,
}

impl<T> Edge<T> {
    fn rank(&self) -> u8 {
        match self {
            Self::Begin(_) => 0,
            Self::End => 1,
        }
    }
}

#[derive(Debug)]
struct Event<T> {
    position: u64,
    source: usize,
    edge: Edge<T>,
}

impl<T> Event<T> {
    fn sort_key(&self) -> (u64, u8, usize) {
        (self.position, self.edge.rank(), self.source)
    }
}

type EventStream<'a, T> = Box<dyn Iterator<Item = CoreResult<Event<T>>> + 'a>;

fn edges<'a, T, I>(source: usize, input: I) -> impl Iterator<Item = CoreResult<Event<T>>> + 'a
where
    T: 'a,
    I: Iterator<Item = CoreResult<(Range, T)>> + 'a,
{
    input.flat_map(move |item| {
        let pair = match item {
            Ok((range, data)) => [
                Some(Ok(Event {
                    position: u64::from(range.begin()),
                    source,
                    edge: Edge::Begin(data),
                })),
                Some(Ok(Event {
                    position: u64::from(range.end()) + 1,
                    source,
                    edge: Edge::End,
                })),
            ],
            Err(e) => [Some(Err(e)), None],
        };
        pair.into_iter().flatten()
    })
}

/// Errors sort first so they surface as early as possible.
fn event_less<T>(a: &CoreResult<Event<T>>, b: &CoreResult<Event<T>>) -> bool {
    match (a, b) {
        (Err(_), _) => true,
        (_, Err(_)) => false,
        (Ok(a), Ok(b)) => a.sort_key() < b.sort_key(),
    }
}

struct Sweep<'a, T> {
    events: Peekable<EventStream<'a, T>>,
    active: BTreeMap<usize, T>,
    previous: Option<u64>,
    done: bool,
}

impl<T: Clone> Sweep<'_, T> {
    fn next(&mut self) -> Option<CoreResult<MergedInterval<T>>> {
        if self.done {
            return None;
        }

        loop {
            let first = match self.events.next() {
                None => return self.finish(),
                Some(Err(e)) => return self.fail(e),
                Some(Ok(event)) => event,
            };
            let position = first.position;

            let pending = match self.previous {
                Some(previous) if position <= previous => {
                    return self.fail(CoreError::corrupt_merge_input(format!(
                        "edge at position {position} follows position {previous}; \
                         source {} is unsorted or overlapping",
                        first.source
                    )));
                }
                Some(previous) if !self.active.is_empty() => {
                    match self.interval(previous, position - 1) {
                        Ok(interval) => Some(interval),
                        Err(e) => return self.fail(e),
                    }
                }
                _ => None,
            };

            if let Err(e) = self.apply(first) {
                return self.fail(e);
            }
            while let Some(Ok(event)) = self.events.peek() {
                if event.position != position {
                    break;
                }
                if let Some(Ok(event)) = self.events.next() {
                    if let Err(e) = self.apply(event) {
                        return self.fail(e);
                    }
                }
            }
            self.previous = Some(position);

            if let Some(interval) = pending {
                return Some(Ok(interval));
            }
        }
    }

    fn interval(&self, begin: u64, end: u64) -> CoreResult<MergedInterval<T>> {
        let to_address = |position: u64| {
            Address::try_from(position).map_err(|_| {
                CoreError::corrupt_merge_input(format!(
                    "position {position} is outside the address space"
                ))
            })
        };

        Ok(MergedInterval {
            range: Range::new(to_address(begin)?, to_address(end)?)?,
            active: self.active.values().cloned().collect(),
        })
    }

    fn apply(&mut self, event: Event<T>) -> CoreResult<()> {
        match event.edge {
            Edge::Begin(data) => {
                if self.active.insert(event.source, data).is_some() {
                    return Err(CoreError::corrupt_merge_input(format!(
                        "source {} opens a range at {} while another is still open",
                        event.source, event.position
                    )));
                }
            }
            Edge::End => {
                if self.active.remove(&event.source).is_none() {
                    return Err(CoreError::corrupt_merge_input(format!(
                        "source {} closes a range at {} that was never opened",
                        event.source, event.position
                    )));
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Option<CoreResult<MergedInterval<T>>> {
        self.done = true;
        if self.active.is_empty() {
            return None;
        }
        let open: Vec<usize> = self.active.keys().copied().collect();
        Some(Err(CoreError::corrupt_merge_input(format!(
            "ranges of sources {open:?} still open after the last edge"
        ))))
    }

    fn fail(&mut self, error: CoreError) -> Option<CoreResult<MergedInterval<T>>> {
        self.done = true;
        Some(Err(error))
    }
}
