use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source column/row for every destination pixel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScaleLut {
    src_x: Vec<usize>,
    src_y: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn dst_size(&self) -> (usize, usize) {
        (self.src_x.len(), self.src_y.len())
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let map = |dst: usize, src: usize| -> Vec<usize> {
        if src == 0 {
            return vec![0; dst];
        }
        let s = src as f32 / dst as f32;
        (0..dst)
            .map(|d| ((d as f32 * s) as usize).min(src - 1))
            .collect()
    };

    ScaleLut {
        src_x: map(dst_w, src_w),
        src_y: map(dst_h, src_h),
    }
}

/// Parallel nearest-neighbour stretch, one destination row per task.
/// Keeps the blocky ray strips crisp at any window size.
pub fn blit_nearest(dst: &mut [u32], dw: usize, src: &[u32], sw: usize, lut: &ScaleLut) {
    if dw == 0 {
        return;
    }
    dst.par_chunks_mut(dw)
        .zip(lut.src_y.par_iter())
        .for_each(|(dst_row, &sy)| {
            let row = &src[sy * sw..(sy + 1) * sw];
            for (d, &sx) in dst_row.iter_mut().zip(&lut.src_x) {
                *d = row[sx];
            }
        });
}
