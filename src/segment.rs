//! Run-length segmentation.
//!
//! Splits a label sequence into maximal runs of equal labels. Stints, corners,
//! straights, activation zones and faster-side splits are all this primitive
//! applied to a different labelling of the data.

use serde::{Deserialize, Serialize};

/// A maximal run of one label over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment<L> {
    /// First index of the run
    pub start: usize,
    /// One past the last index of the run
    pub end: usize,
    pub label: L,
}

impl<L> Segment<L> {
    /// Number of elements in the run.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for segments produced by `segment_runs`.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Index range covered by the run.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// Index of the last element of the run.
    pub fn last(&self) -> usize {
        self.end.saturating_sub(1)
    }
}

/// Partition `labels` into maximal runs of equal labels, left to right.
///
/// Segments cover the input exactly with no gaps or overlaps, and no two
/// neighbouring segments share a label. Empty input gives no segments.
///
/// # Example
/// ```
/// use lapdelta::segment_runs;
///
/// let runs = segment_runs(&['a', 'a', 'b', 'a']);
/// assert_eq!(runs.len(), 3);
/// assert_eq!((runs[0].start, runs[0].end), (0, 2));
/// assert_eq!(runs[2].label, 'a');
/// ```
pub fn segment_runs<L: PartialEq + Clone>(labels: &[L]) -> Vec<Segment<L>> {
    let mut segments = Vec::new();
    let Some(first) = labels.first() else {
        return segments;
    };

    let mut start = 0;
    let mut current = first;

    for (i, label) in labels.iter().enumerate().skip(1) {
        if label != current {
            segments.push(Segment {
                start,
                end: i,
                label: current.clone(),
            });
            start = i;
            current = label;
        }
    }

    segments.push(Segment {
        start,
        end: labels.len(),
        label: current.clone(),
    });

    segments
}

/// Label every item with `label_of`, then segment the labels.
pub fn segment_by<T, L, F>(items: &[T], label_of: F) -> Vec<Segment<L>>
where
    L: PartialEq + Clone,
    F: Fn(&T) -> L,
{
    let labels: Vec<L> = items.iter().map(label_of).collect();
    segment_runs(&labels)
}

/// Runs where a boolean labelling holds, dropping the `false` runs.
pub(crate) fn true_runs<T, F>(items: &[T], predicate: F) -> Vec<Segment<bool>>
where
    F: Fn(&T) -> bool,
{
    segment_by(items, predicate)
        .into_iter()
        .filter(|s| s.label)
        .collect()
}
