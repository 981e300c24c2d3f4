use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: u64,
    pub class: i32,
    pub confidence: f64,
    pub bbox: BBox<Ltrb>,

    // frames matched, creation included
    pub hits: u32,

    // consecutive frames without a match
    pub missed: u32,

    // in seconds
    pub last_seen: f64,
}
