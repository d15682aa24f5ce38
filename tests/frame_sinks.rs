use std::path::PathBuf;

use playoff::{DirSink, FrameSink, RunStamp, ZipSink, frame_file_name};

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("playoff-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn zip_sink_preserves_capture_order() {
    let dir = scratch_dir("zip");
    let path = dir.join("frames.zip");
    let stamp = RunStamp::invalid();

    let mut sink = ZipSink::create(&path).unwrap();
    for i in 0..3u64 {
        sink.push_frame(&frame_file_name(&stamp, i), &[i as u8; 8])
            .unwrap();
    }
    sink.finish().unwrap();
    // Finishing twice is an error, not silent corruption.
    assert!(sink.finish().is_err());
    assert!(sink.push_frame("late.png", &[0]).is_err());

    let file = std::fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 3);
    for i in 0..3 {
        let entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), frame_file_name(&stamp, i as u64));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn dir_sink_writes_loose_frames() {
    let dir = scratch_dir("dir");
    let out = dir.join("frames");
    let stamp = RunStamp::invalid();

    let mut sink = DirSink::create(&out).unwrap();
    sink.push_frame(&frame_file_name(&stamp, 0), b"one").unwrap();
    sink.push_frame(&frame_file_name(&stamp, 7), b"two").unwrap();
    sink.finish().unwrap();

    let first = std::fs::read(out.join(frame_file_name(&stamp, 0))).unwrap();
    assert_eq!(first, b"one");
    assert!(out.join(frame_file_name(&stamp, 7)).exists());

    std::fs::remove_dir_all(&dir).ok();
}
