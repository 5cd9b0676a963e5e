// -------------------------------------------------------------------------------------------------

/// Copy the given planar buffer into an interleaved one.
/// The planar buffer's layout defines the layout of the interleaved buffer (channel and frame count).
pub fn planar_to_interleaved(planar: &[Vec<f32>], interleaved: &mut [f32]) {
    let channel_count = planar.len();
    match channel_count {
        1 => {
            for (i, p) in interleaved.iter_mut().zip(planar[0].iter()) {
                *i = *p;
            }
        }
        2 => {
            for ((frame, l), r) in interleaved
                .chunks_exact_mut(2)
                .zip(planar[0].iter())
                .zip(planar[1].iter())
            {
                frame[0] = *l;
                frame[1] = *r;
            }
        }
        _ => {
            for (frame_index, frame) in interleaved.chunks_exact_mut(channel_count).enumerate() {
                for (value, channel) in frame.iter_mut().zip(planar.iter()) {
                    *value = channel[frame_index];
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Copy the given interleaved buffer into a planar one.
/// The planar buffer's layout defines the layout of the interleaved buffer (channel and frame count).
pub fn interleaved_to_planar(interleaved: &[f32], planar: &mut [Vec<f32>]) {
    let channel_count = planar.len();
    match channel_count {
        1 => {
            for (p, i) in planar[0].iter_mut().zip(interleaved) {
                *p = *i;
            }
        }
        2 => {
            let (left, right) = planar.split_at_mut(1);
            for ((frame, l), r) in interleaved
                .chunks_exact(2)
                .zip(left[0].iter_mut())
                .zip(right[0].iter_mut())
            {
                *l = frame[0];
                *r = frame[1];
            }
        }
        _ => {
            for (frame_index, frame) in interleaved.chunks_exact(channel_count).enumerate() {
                for (value, channel) in frame.iter().zip(planar.iter_mut()) {
                    channel[frame_index] = *value;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_interleaved() {
        // mono
        let planar_mono = vec![vec![0.5, -0.5, 0.25, -0.25]];
        let interleaved_mono = vec![0.5, -0.5, 0.25, -0.25];
        let mut planar_mono_copy = planar_mono.clone();
        let mut interleaved_mono_copy = interleaved_mono.clone();

        planar_to_interleaved(&planar_mono, &mut interleaved_mono_copy);
        interleaved_to_planar(&interleaved_mono, &mut planar_mono_copy);
        assert_eq!(planar_mono, planar_mono_copy);
        assert_eq!(interleaved_mono, interleaved_mono_copy);

        // stereo
        let planar_stereo = vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]];
        let interleaved_stereo = vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        let mut planar_stereo_copy = planar_stereo.clone();
        let mut interleaved_stereo_copy = interleaved_stereo.clone();

        planar_to_interleaved(&planar_stereo, &mut interleaved_stereo_copy);
        interleaved_to_planar(&interleaved_stereo, &mut planar_stereo_copy);
        assert_eq!(planar_stereo, planar_stereo_copy);
        assert_eq!(interleaved_stereo, interleaved_stereo_copy);

        // quad
        let planar_quad = vec![
            vec![1.0, 5.0],
            vec![2.0, 6.0],
            vec![3.0, 7.0],
            vec![4.0, 8.0],
        ];
        let interleaved_quad = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut planar_quad_copy = planar_quad.clone();
        let mut interleaved_quad_copy = interleaved_quad.clone();

        planar_to_interleaved(&planar_quad, &mut interleaved_quad_copy);
        interleaved_to_planar(&interleaved_quad, &mut planar_quad_copy);
        assert_eq!(planar_quad, planar_quad_copy);
        assert_eq!(interleaved_quad, interleaved_quad_copy);
    }
}
