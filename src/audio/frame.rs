// One stereo frame, the unit everything downstream of the decoder works in.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(sample: f32) -> Self {
        Self { left: sample, right: sample }
    }

    /// Mix `other` in at `gain`. Plain superposition, nothing limits the sum.
    pub fn accumulate(&mut self, other: StereoFrame, gain: f32) {
        self.left += other.left * gain;
        self.right += other.right * gain;
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
