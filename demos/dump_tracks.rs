use std::io::BufReader;

use uavtrack::{BBoxTracker, Frame, TrackerConfig};

fn main() -> Result<(), uavtrack::Error> {
    let mut args = std::env::args().skip(1);

    let in_file_name = match args.next() {
        Some(name) => name,
        None => {
            eprintln!("usage: dump_tracks <detections file> [tracker config json]");
            std::process::exit(2);
        }
    };

    let config = match args.next() {
        Some(path) => TrackerConfig::from_reader(std::fs::File::open(path)?)?,
        None => TrackerConfig::default(),
    };

    let dets_file = std::fs::File::open(in_file_name)?;
    let frames = Frame::read_lines(BufReader::new(dets_file))?;

    let mut tracker = BBoxTracker::new(config);

    for frame in &frames {
        for res in tracker.process_at(frame.timestamp, &frame.detections) {
            let [x1, y1, x2, y2]: [f64; 4] = res.bbox.into();

            println!(
                "{} {:.2} {:.2} {:.2} {:.2} {}",
                res.track_id, x1, y1, x2, y2, frame.timestamp
            );
        }
    }

    eprintln!("{} frames, {} live tracks", frames.len(), tracker.len());

    Ok(())
}
