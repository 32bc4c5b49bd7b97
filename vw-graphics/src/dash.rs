//! Dash pattern walking for horizontal rules.

/// A normalized dash pattern: an even-length cycle of on/off lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DashPattern {
    segments: Vec<i32>,
    cycle: i64,
}

impl DashPattern {
    /// Build a pattern from alternating on/off lengths.
    ///
    /// Returns `None` (draw solid) for empty or all-zero patterns, or when any
    /// length is negative. Odd-length patterns are repeated once so that every
    /// cycle starts with an "on" segment.
    pub(crate) fn new(lengths: &[i32]) -> Option<Self> {
        if lengths.is_empty() || lengths.iter().any(|&v| v < 0) {
            return None;
        }
        let mut segments = lengths.to_vec();
        if segments.len() % 2 == 1 {
            segments.extend_from_slice(lengths);
        }
        let cycle: i64 = segments.iter().map(|&v| v as i64).sum();
        if cycle <= 0 {
            return None;
        }
        // A pattern with nothing "off" is solid.
        if segments.iter().skip(1).step_by(2).all(|&v| v == 0) {
            return None;
        }
        Some(Self { segments, cycle })
    }

    /// The phase reached after walking `distance` units from `running_offset`.
    pub(crate) fn advance(&self, running_offset: i32, distance: i64) -> i32 {
        ((running_offset as i64).rem_euclid(self.cycle) + distance.max(0)).rem_euclid(self.cycle) as i32
    }

    /// Compute the "on" spans covering `[left, right)` starting at phase
    /// `running_offset`, and the phase at `right` for the next call.
    pub(crate) fn spans(&self, left: i32, right: i32, running_offset: i32) -> (Vec<(i32, i32)>, i32) {
        let phase = (running_offset as i64).rem_euclid(self.cycle);
        let mut spans = Vec::new();
        let mut x = left as i64 - phase;
        let right64 = right as i64;
        let mut index = 0;
        while x < right64 {
            let len = self.segments[index % self.segments.len()] as i64;
            let end = x + len;
            if index % 2 == 0 {
                let s = x.max(left as i64);
                let e = end.min(right64);
                if e > s {
                    spans.push((s as i32, e as i32));
                }
            }
            x = end;
            index += 1;
        }
        (spans, self.advance(running_offset, right64 - left as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(spans: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
        let mut out: Vec<(i32, i32)> = Vec::new();
        for (s, e) in spans {
            match out.last_mut() {
                Some(last) if last.1 == s => last.1 = e,
                _ => out.push((s, e)),
            }
        }
        out
    }

    #[test]
    fn test_degenerate_patterns_are_solid() {
        assert!(DashPattern::new(&[]).is_none());
        assert!(DashPattern::new(&[0, 0]).is_none());
        assert!(DashPattern::new(&[5, -1]).is_none());
        assert!(DashPattern::new(&[5, 0]).is_none());
    }

    #[test]
    fn test_odd_pattern_is_doubled() {
        let p = DashPattern::new(&[3]).unwrap();
        assert_eq!(p.cycle, 6);
        let (spans, _) = p.spans(0, 12, 0);
        assert_eq!(spans, vec![(0, 3), (6, 9)]);
    }

    #[test]
    fn test_spans_clip_to_range() {
        let p = DashPattern::new(&[4, 2]).unwrap();
        let (spans, next) = p.spans(0, 15, 0);
        assert_eq!(spans, vec![(0, 4), (6, 10), (12, 15)]);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_phase_offset() {
        let p = DashPattern::new(&[4, 2]).unwrap();
        // Starting two units into the cycle: the first dash is half drawn.
        let (spans, _) = p.spans(10, 20, 2);
        assert_eq!(spans, vec![(10, 12), (14, 18)]);
    }

    #[test]
    fn test_split_calls_match_single_call() {
        let p = DashPattern::new(&[5, 3, 1, 3]).unwrap();
        let (single, single_next) = p.spans(7, 107, 4);
        for split in [8, 9, 12, 13, 40, 77, 106] {
            let (mut first, mid) = p.spans(7, split, 4);
            let (second, next) = p.spans(split, 107, mid);
            first.extend(second);
            assert_eq!(merge(first), merge(single.clone()), "split at {}", split);
            assert_eq!(next, single_next);
        }
    }

    #[test]
    fn test_advance_matches_spans() {
        let p = DashPattern::new(&[5, 3, 1, 3]).unwrap();
        let (_, next) = p.spans(-40, 33, 7);
        assert_eq!(p.advance(7, 73), next);
        assert_eq!(p.advance(7, 400_000_000), (7 + 400_000_000) % 12);
    }

    #[test]
    fn test_negative_offset_wraps() {
        let p = DashPattern::new(&[4, 2]).unwrap();
        let (a, _) = p.spans(0, 12, -2);
        let (b, _) = p.spans(0, 12, 4);
        assert_eq!(a, b);
    }
}
