use tantivy::collector::{Collector, SegmentCollector};
use tantivy::{DocId, Score, SegmentOrdinal, SegmentReader};

/// Every matching document with its score, unordered and unbounded.
///
/// Clause-wise scoring needs all matches of a clause. A top-N collector
/// sized to the whole index would reserve that many slots per segment.
pub struct ScoredDocs;

impl Collector for ScoredDocs {
	type Fruit = Vec<(Score, (SegmentOrdinal, DocId))>;
	type Child = ScoredSegmentDocs;

	fn for_segment(&self, segment_ord: SegmentOrdinal, _segment: &SegmentReader) -> tantivy::Result<Self::Child> {
		Ok(ScoredSegmentDocs { segment_ord, docs: Vec::new() })
	}

	fn requires_scoring(&self) -> bool {
		true
	}

	fn merge_fruits(&self, segment_fruits: Vec<<Self::Child as SegmentCollector>::Fruit>) -> tantivy::Result<Self::Fruit> {
		Ok(segment_fruits.into_iter().flatten().collect())
	}
}

pub struct ScoredSegmentDocs {
	segment_ord: SegmentOrdinal,
	docs: Vec<(Score, (SegmentOrdinal, DocId))>,
}

impl SegmentCollector for ScoredSegmentDocs {
	type Fruit = Vec<(Score, (SegmentOrdinal, DocId))>;

	fn collect(&mut self, doc: DocId, score: Score) {
		self.docs.push((score, (self.segment_ord, doc)));
	}

	fn harvest(self) -> Self::Fruit {
		self.docs
	}
}
