use crate::classify::Classifier;
use crate::foundation::core::CodePoint;

/// A maximal run of consecutive input codes sharing one block.
///
/// `block` is the block-table index, or `None` for the undefined pseudo-block
/// (consecutive blockless codes share one run).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockRun {
    /// Block-table index, `None` for blockless codes.
    pub block: Option<usize>,
    /// Index of the run's first member in the input sequence.
    pub start: usize,
    /// Number of members.
    pub len: usize,
}

/// One independent rendering task: the code point plus its position inside
/// its same-block run. Tasks share no mutable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTask {
    /// Original input index; output order key.
    pub index: usize,
    /// The code point to render.
    pub code: CodePoint,
    /// 0-based position within the run.
    pub run_pos: usize,
    /// Run length; progress denominator.
    pub run_len: usize,
}

/// Partition the input sequence into maximal same-block runs.
pub fn partition_runs(codes: &[CodePoint], classifier: &Classifier<'_>) -> Vec<BlockRun> {
    let mut runs: Vec<BlockRun> = Vec::new();
    for (i, &code) in codes.iter().enumerate() {
        let block = classifier.block_of(code).map(|(idx, _)| idx);
        match runs.last_mut() {
            Some(run) if run.block == block => run.len += 1,
            _ => runs.push(BlockRun {
                block,
                start: i,
                len: 1,
            }),
        }
    }
    runs
}

/// Expand runs into per-index render tasks with progress coordinates.
pub fn build_tasks(codes: &[CodePoint], runs: &[BlockRun]) -> Vec<RenderTask> {
    let mut tasks = Vec::with_capacity(codes.len());
    for run in runs {
        for pos in 0..run.len {
            let index = run.start + pos;
            tasks.push(RenderTask {
                index,
                code: codes[index],
                run_pos: pos,
                run_len: run.len,
            });
        }
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bundle::UnicodeBundle;
    use crate::data::records::NamesTable;
    use crate::data::set::CodePointSet;
    use crate::data::tables::{BlockRange, BlockTable, CommonNameTable, VersionTable};

    fn cp(v: u32) -> CodePoint {
        CodePoint::new(v).unwrap()
    }

    fn test_bundle() -> UnicodeBundle {
        UnicodeBundle::from_parts(
            NamesTable::default(),
            CommonNameTable::default(),
            VersionTable::default(),
            BlockTable::new(vec![
                BlockRange {
                    start: 0,
                    end: 0x7F,
                    name: "Basic Latin".to_owned(),
                    local_name: "基本拉丁文".to_owned(),
                },
                BlockRange {
                    start: 0x370,
                    end: 0x3FF,
                    name: "Greek and Coptic".to_owned(),
                    local_name: "希腊文及科普特文".to_owned(),
                },
            ])
            .unwrap(),
            CodePointSet::new(),
            Vec::new(),
        )
    }

    #[test]
    fn block_change_splits_runs() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let codes: Vec<CodePoint> = [0x41, 0x42, 0x370, 0x371, 0x372]
            .iter()
            .map(|&v| cp(v))
            .collect();
        let runs = partition_runs(&codes, &c);
        assert_eq!(
            runs,
            vec![
                BlockRun { block: Some(0), start: 0, len: 2 },
                BlockRun { block: Some(1), start: 2, len: 3 },
            ]
        );
    }

    #[test]
    fn consecutive_blockless_codes_share_one_run() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        // 0x100 and 0x200 fall in the gap between the two test blocks.
        let codes: Vec<CodePoint> = [0x41, 0x100, 0x200, 0x370].iter().map(|&v| cp(v)).collect();
        let runs = partition_runs(&codes, &c);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1], BlockRun { block: None, start: 1, len: 2 });
    }

    #[test]
    fn tasks_carry_run_coordinates() {
        let bundle = test_bundle();
        let c = Classifier::new(&bundle);
        let codes: Vec<CodePoint> = [0x41, 0x42, 0x370].iter().map(|&v| cp(v)).collect();
        let runs = partition_runs(&codes, &c);
        let tasks = build_tasks(&codes, &runs);
        assert_eq!(tasks.len(), 3);
        assert_eq!((tasks[0].run_pos, tasks[0].run_len), (0, 2));
        assert_eq!((tasks[1].run_pos, tasks[1].run_len), (1, 2));
        assert_eq!((tasks[2].run_pos, tasks[2].run_len), (0, 1));
        assert_eq!(tasks[1].index, 1);
        assert_eq!(tasks[2].code, cp(0x370));
    }
}
