/// One detector-reported keypoint in normalized image coordinates.
///
/// `x` and `y` are fractions of frame width/height (0..1 for on-screen
/// points, may overshoot slightly at the frame edge). `z` is the detector's
/// relative depth, unused by the geometry here but carried through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }
}

/// All landmarks for one detected subject (one hand, one body).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectLandmarks {
    pub landmarks: Vec<Landmark>,
}

impl SubjectLandmarks {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }
}
