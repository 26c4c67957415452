//! Pipeline ordering and progress-accounting properties, driven through the
//! producer seam with an in-memory sink.

use std::time::Duration;

use uniflash::compose::FrameRGBA;
use uniflash::data::bundle::UnicodeBundle;
use uniflash::data::records::NamesTable;
use uniflash::data::set::CodePointSet;
use uniflash::data::tables::{BlockRange, BlockTable, CommonNameTable, VersionTable};
use uniflash::encode::{InMemorySink, SinkConfig};
use uniflash::pipeline::runs::{RenderTask, build_tasks, partition_runs};
use uniflash::pipeline::{PipelineOpts, run_pipeline};
use uniflash::{Classifier, CodePoint, UniflashError};

fn cp(v: u32) -> CodePoint {
    CodePoint::new(v).unwrap()
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 8,
        height: 8,
        fps: 15.0,
    }
}

fn tasks(n: usize) -> Vec<RenderTask> {
    (0..n)
        .map(|i| RenderTask {
            index: i,
            code: cp(0x4E00 + i as u32),
            run_pos: i,
            run_len: n,
        })
        .collect()
}

/// A frame whose first byte records the task index.
fn tagged(task: &RenderTask) -> FrameRGBA {
    let mut frame = FrameRGBA::new_gray(8, 8, 0);
    frame.data[0] = task.index as u8;
    frame
}

#[test]
fn output_order_survives_skewed_worker_latency() {
    // Earlier indices sleep longest, so completion order is roughly the
    // reverse of submission order.
    let tasks = tasks(24);
    let mut sink = InMemorySink::new();
    let stats = run_pipeline(
        &tasks,
        cfg(),
        &PipelineOpts {
            threads: Some(4),
            chunk_size: 24,
            channel_capacity: 4,
        },
        |task| {
            std::thread::sleep(Duration::from_millis((24 - task.index) as u64 * 3));
            Ok(tagged(task))
        },
        &mut sink,
    )
    .unwrap();

    assert_eq!(stats.frames_encoded, 24);
    assert_eq!(sink.frames().len(), 24);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(frame.data[0], i as u8);
    }
}

#[test]
fn chunked_submission_preserves_order_across_chunks() {
    let tasks = tasks(100);
    let mut sink = InMemorySink::new();
    run_pipeline(
        &tasks,
        cfg(),
        &PipelineOpts {
            threads: Some(3),
            chunk_size: 7,
            channel_capacity: 2,
        },
        |task| Ok(tagged(task)),
        &mut sink,
    )
    .unwrap();

    let got: Vec<u64> = sink.frames().iter().map(|(idx, _)| idx.0).collect();
    let want: Vec<u64> = (0..100).collect();
    assert_eq!(got, want);
}

#[test]
fn worker_failure_is_terminal_and_aborts_the_sink() {
    let tasks = tasks(40);
    let mut sink = InMemorySink::new();
    let err = run_pipeline(
        &tasks,
        cfg(),
        &PipelineOpts {
            threads: Some(4),
            chunk_size: 40,
            channel_capacity: 4,
        },
        |task| {
            if task.index == 13 {
                Err(UniflashError::render("injected worker failure"))
            } else {
                Ok(tagged(task))
            }
        },
        &mut sink,
    )
    .unwrap_err();

    assert!(matches!(err, UniflashError::Render(_)));
    assert!(sink.aborted());
    // Nothing past the failure index was delivered.
    assert!(sink.frames().iter().all(|(idx, _)| idx.0 < 13));
}

#[test]
fn progress_accounting_follows_run_membership() {
    let bundle = UnicodeBundle::from_parts(
        NamesTable::default(),
        CommonNameTable::default(),
        VersionTable::default(),
        BlockTable::new(vec![
            BlockRange {
                start: 0x00,
                end: 0x7F,
                name: "Basic Latin".to_owned(),
                local_name: "基本拉丁文".to_owned(),
            },
            BlockRange {
                start: 0x80,
                end: 0xFF,
                name: "Latin-1 Supplement".to_owned(),
                local_name: "拉丁文-1补充".to_owned(),
            },
        ])
        .unwrap(),
        CodePointSet::new(),
        Vec::new(),
    );
    let classifier = Classifier::new(&bundle);

    let codes: Vec<CodePoint> = [0x41, 0x42, 0x43, 0x80, 0x81].iter().map(|&v| cp(v)).collect();
    let runs = partition_runs(&codes, &classifier);
    let tasks = build_tasks(&codes, &runs);

    // The i-th (0-based) member of a length-L run reports (i+1)/L.
    let progress: Vec<f64> = tasks
        .iter()
        .map(|t| (t.run_pos + 1) as f64 / t.run_len as f64)
        .collect();
    let want = [1.0 / 3.0, 2.0 / 3.0, 1.0, 0.5, 1.0];
    for (got, want) in progress.iter().zip(want.iter()) {
        assert!((got - want).abs() < 1e-12, "{got} != {want}");
    }
}
