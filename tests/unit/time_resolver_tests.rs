/*!
 * Tests for annotation interval resolution
 */

use elantime::document::{AnnotationId, AnnotationNode, DocumentIndex, DocumentTree, ResolvedInterval, TierNode};
use elantime::errors::{ChainBreak, TimeError};
use elantime::timing::{IntervalCache, TimeResolver};
use crate::common;

/// Test the floor-division split of an interval that does not divide evenly
#[test]
fn test_resolve_withUnevenSplit_shouldPartitionParent() {
    let index = DocumentIndex::build(common::layered_document()).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    let parts: Vec<ResolvedInterval> = ["m1", "m2", "m3"]
        .iter()
        .map(|id| resolver.resolve(&(*id).into()).unwrap())
        .collect();

    assert_eq!(parts[0], ResolvedInterval::new(0, 333));
    assert_eq!(parts[1], ResolvedInterval::new(333, 667));
    assert_eq!(parts[2], ResolvedInterval::new(667, 1001));
    let total: u64 = parts.iter().map(|p| p.duration_ms()).sum();
    assert_eq!(total, 1001);
}

/// Test that a grandchild inherits its parent's subdivided span
#[test]
fn test_resolve_withGrandchild_shouldInheritSubdividedSpan() {
    let index = DocumentIndex::build(common::layered_document()).unwrap();
    let cache = IntervalCache::default();

    let gloss = TimeResolver::new(&index, &cache).resolve(&"g1".into()).unwrap();

    assert_eq!(gloss, ResolvedInterval::new(0, 333));
}

/// Test that a missing marker value only affects annotations under it
#[test]
fn test_resolve_withUnsetMarker_shouldFailOnlyThatBranch() {
    let index = DocumentIndex::build(common::layered_document()).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    assert_eq!(
        resolver.resolve(&"s3".into()).unwrap_err(),
        TimeError::UnresolvableTime {
            annotation: "s3".into(),
            marker: "ts4".into()
        }
    );
    assert_eq!(resolver.resolve(&"m4".into()).unwrap(), ResolvedInterval::new(1001, 2500));
}

/// Test that a zero-length parent yields zero-length children
#[test]
fn test_resolve_withZeroLengthParent_shouldYieldEmptyIntervals() {
    let tree = DocumentTree::new()
        .with_marker("m1", Some(700))
        .with_marker("m2", Some(700))
        .with_tier(TierNode::new("t").with_annotation(AnnotationNode::alignable("p", "m1", "m2", "")))
        .with_tier(
            TierNode::new("c")
                .with_parent("t")
                .with_annotation(AnnotationNode::reference("x", "p", None, ""))
                .with_annotation(AnnotationNode::reference("y", "p", Some("x"), "")),
        );
    let index = DocumentIndex::build(tree).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    assert_eq!(resolver.resolve(&"x".into()).unwrap(), ResolvedInterval::new(700, 700));
    assert_eq!(resolver.resolve(&"y".into()).unwrap(), ResolvedInterval::new(700, 700));
}

/// Test that a broken sibling chain fails every member of the group
#[test]
fn test_resolve_withBrokenChain_shouldFailEveryMember() {
    let tree = DocumentTree::new()
        .with_marker("m1", Some(0))
        .with_marker("m2", Some(90))
        .with_tier(TierNode::new("t").with_annotation(AnnotationNode::alignable("p", "m1", "m2", "")))
        .with_tier(
            TierNode::new("c")
                .with_parent("t")
                .with_annotation(AnnotationNode::reference("x", "p", None, ""))
                .with_annotation(AnnotationNode::reference("y", "p", None, "")),
        );
    let index = DocumentIndex::build(tree).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    for id in ["x", "y"] {
        let err = resolver.resolve(&id.into()).unwrap_err();
        assert!(matches!(
            err,
            TimeError::BrokenChain {
                reason: ChainBreak::MultipleHeads(_),
                ..
            }
        ));
    }
    assert_eq!(resolver.resolve(&"p".into()).unwrap(), ResolvedInterval::new(0, 90));
}

/// Test that a cached resolver and an uncached one agree
#[test]
fn test_resolve_withCacheDisabled_shouldMatchCachedResult() {
    let index = DocumentIndex::build(common::layered_document()).unwrap();
    let cached = IntervalCache::default();
    let uncached = IntervalCache::new(false);

    for id in ["s1", "s2", "m1", "m2", "m3", "m4", "g1"] {
        let a = TimeResolver::new(&index, &cached).resolve(&id.into()).unwrap();
        let b = TimeResolver::new(&index, &uncached).resolve(&id.into()).unwrap();
        assert_eq!(a, b, "mismatch for {}", id);
    }
    assert!(uncached.is_empty());
    assert!(!cached.is_empty());
}

/// Test that repeated resolution is served from the cache
#[test]
fn test_resolve_twice_shouldHitCache() {
    let index = DocumentIndex::build(common::utterance_document()).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    let first = resolver.resolve(&"a3".into()).unwrap();
    let second = resolver.resolve(&"a3".into()).unwrap();

    assert_eq!(first, second);
    let (hits, _, _) = cache.stats();
    assert!(hits >= 1);
}

/// Test that an unknown id is reported rather than panicking
#[test]
fn test_resolve_withUnknownId_shouldFail() {
    let index = DocumentIndex::build(common::utterance_document()).unwrap();
    let cache = IntervalCache::default();

    let err = TimeResolver::new(&index, &cache).resolve(&"ghost".into()).unwrap_err();

    assert_eq!(err, TimeError::UnknownAnnotation("ghost".into()));
}

/// Test that subdivision tiles the parent for many part counts, including more parts than milliseconds
#[test]
fn test_subdivide_withManyPartCounts_shouldTileParent() {
    let cases: [(u64, u64); 9] = [(1, 10), (3, 10), (3, 1001), (4, 0), (7, 5), (10, 3), (13, 1000), (60, 59), (1000, 999_999)];

    for (count, duration) in cases {
        let start = 250;
        let parent = ResolvedInterval::new(start, start + duration);
        let parts: Vec<ResolvedInterval> = (0..count as usize).map(|k| parent.subdivide(k, count as usize)).collect();

        assert_eq!(parts[0].start_ms, parent.start_ms, "N={} D={}", count, duration);
        assert_eq!(parts[parts.len() - 1].end_ms, parent.end_ms, "N={} D={}", count, duration);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end_ms, pair[1].start_ms, "gap for N={} D={}", count, duration);
        }
        for (k, part) in parts.iter().enumerate() {
            let k = k as u64;
            let expected = (k + 1) * duration / count - k * duration / count;
            assert_eq!(part.duration_ms(), expected, "part {} for N={} D={}", k, count, duration);
        }
        assert_eq!(parts.iter().map(|p| p.duration_ms()).sum::<u64>(), duration);
    }
}

/// Test that a chain with more members than parent milliseconds still covers the parent
#[test]
fn test_resolve_withMoreSiblingsThanMilliseconds_shouldCoverParent() {
    let mut words = TierNode::new("c").with_parent("t");
    for k in 0..5 {
        let previous = (k > 0).then(|| format!("w{}", k - 1));
        words = words.with_annotation(AnnotationNode::reference(&format!("w{}", k), "p", previous.as_deref(), ""));
    }
    let tree = DocumentTree::new()
        .with_marker("m1", Some(100))
        .with_marker("m2", Some(103))
        .with_tier(TierNode::new("t").with_annotation(AnnotationNode::alignable("p", "m1", "m2", "")))
        .with_tier(words);
    let index = DocumentIndex::build(tree).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    let parts: Vec<ResolvedInterval> = (0..5)
        .map(|k| resolver.resolve(&AnnotationId::from(format!("w{}", k))).unwrap())
        .collect();

    assert_eq!(parts[0].start_ms, 100);
    assert_eq!(parts[4].end_ms, 103);
    for pair in parts.windows(2) {
        assert_eq!(pair[0].end_ms, pair[1].start_ms);
    }
    assert_eq!(parts.iter().filter(|p| p.duration_ms() == 0).count(), 2);
}

/// Test that a parent with two dependent tiers splits its span per tier
#[test]
fn test_resolve_withTwoChildTiers_shouldSplitEachTierSeparately() {
    let tree = common::utterance_document().with_tier(
        TierNode::new("translation")
            .with_parent("utterance")
            .with_annotation(AnnotationNode::reference("tr1", "a1", None, "le chat")),
    );
    let index = DocumentIndex::build(tree).unwrap();
    let cache = IntervalCache::default();
    let resolver = TimeResolver::new(&index, &cache);

    assert_eq!(resolver.resolve(&"tr1".into()).unwrap(), ResolvedInterval::new(1000, 4000));
    assert_eq!(resolver.resolve(&"a3".into()).unwrap(), ResolvedInterval::new(2000, 3000));
}
