//! Reassembly of unordered contour segments into polylines.
//!
//! Segments live in an arena and are referenced by index; an adjacency map
//! keyed by quantized endpoints plus a `used` bitset drive a greedy walk that
//! consumes every segment exactly once.

use crate::contour::Segment;
use std::collections::HashMap;
use std::collections::VecDeque;

/// Endpoints closer than this (per axis, after rounding) are the same node.
pub const KEY_QUANTUM: f32 = 0.01;

/// Chains shorter than this are degenerate and never stroked.
pub const MIN_CHAIN_POINTS: usize = 3;

pub type PointKey = (i64, i64);

#[inline]
pub fn point_key(p: (f32, f32)) -> PointKey {
    (
        (p.0 / KEY_QUANTUM).round() as i64,
        (p.1 / KEY_QUANTUM).round() as i64,
    )
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chain {
    pub points: Vec<(f32, f32)>,
    /// Tail met head; the stroke should return to the first point.
    pub closed: bool,
    /// Arena indices of the segments this chain consumed, in walk order.
    pub segments: Vec<u32>,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Assembly {
    pub chains: Vec<Chain>,
    /// Number of segments marked used during the walk.
    pub consumed: usize,
}

struct Adjacency {
    map: HashMap<PointKey, Vec<u32>>,
}

impl Adjacency {
    fn build(segments: &[Segment]) -> Self {
        let mut map: HashMap<PointKey, Vec<u32>> = HashMap::with_capacity(segments.len() * 2);
        for (i, seg) in segments.iter().enumerate() {
            let ka = point_key(seg.start());
            let kb = point_key(seg.end());
            map.entry(ka).or_default().push(i as u32);
            if kb != ka {
                map.entry(kb).or_default().push(i as u32);
            }
        }
        Self { map }
    }

    /// First unused segment touching `key`.
    fn next_unused(&self, key: PointKey, used: &[bool]) -> Option<u32> {
        self.map
            .get(&key)?
            .iter()
            .copied()
            .find(|&i| !used[i as usize])
    }
}

/// The endpoint of `seg` that is not at `key`.
#[inline]
fn far_end(seg: &Segment, key: PointKey) -> (f32, f32) {
    if point_key(seg.start()) == key {
        seg.end()
    } else {
        seg.start()
    }
}

/// Build every chain, including degenerate ones.
pub fn assemble(segments: &[Segment]) -> Assembly {
    let adjacency = Adjacency::build(segments);
    let mut used = vec![false; segments.len()];
    let mut consumed = 0usize;
    let mut chains = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        consumed += 1;

        let first = &segments[seed];
        let mut points: VecDeque<(f32, f32)> = VecDeque::with_capacity(8);
        let mut order: VecDeque<u32> = VecDeque::with_capacity(8);
        points.push_back(first.start());
        if point_key(first.end()) != point_key(first.start()) {
            points.push_back(first.end());
        }
        order.push_back(seed as u32);

        let mut closed = false;

        // Tail.
        loop {
            let Some(&tail) = points.back() else { break };
            let tail_key = point_key(tail);
            let Some(next) = adjacency.next_unused(tail_key, &used) else {
                break;
            };
            used[next as usize] = true;
            consumed += 1;
            order.push_back(next);

            let p = far_end(&segments[next as usize], tail_key);
            let key = point_key(p);
            if key == tail_key {
                continue;
            }
            if points.len() > 1 && points.front().map(|&h| point_key(h)) == Some(key) {
                closed = true;
                break;
            }
            points.push_back(p);
        }

        // Head, walking the other way.
        if !closed {
            loop {
                let Some(&head) = points.front() else { break };
                let head_key = point_key(head);
                let Some(next) = adjacency.next_unused(head_key, &used) else {
                    break;
                };
                used[next as usize] = true;
                consumed += 1;
                order.push_front(next);

                let p = far_end(&segments[next as usize], head_key);
                let key = point_key(p);
                if key == head_key {
                    continue;
                }
                if points.len() > 1 && points.back().map(|&t| point_key(t)) == Some(key) {
                    closed = true;
                    break;
                }
                points.push_front(p);
            }
        }

        chains.push(Chain {
            points: points.into_iter().collect(),
            closed,
            segments: order.into_iter().collect(),
        });
    }

    Assembly { chains, consumed }
}

/// Strokable chains only: at least [`MIN_CHAIN_POINTS`] points.
pub fn chains(segments: &[Segment]) -> Vec<Chain> {
    let mut assembly = assemble(segments);
    assembly.chains.retain(|c| c.points.len() >= MIN_CHAIN_POINTS);
    assembly.chains
}
