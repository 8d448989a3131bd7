//! Group-parallel driver.
//!
//! A group is a contiguous, self-contained slice of the batch (one matrix,
//! one package, or several fused packages). Groups never overlap, so they
//! can be processed on any thread in any order.

use crate::types::Real;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Call `body(group_in, group_out)` for every `group_len`-sized group.
///
/// A trailing group may be shorter when `group_len` does not divide the
/// buffer length.
pub(crate) fn for_each_group<F>(sigma_in: &[Real], sigma_out: &mut [Real], group_len: usize, body: F)
where
    F: Fn(&[Real], &mut [Real]) + Send + Sync,
{
    debug_assert_eq!(sigma_in.len(), sigma_out.len());
    if group_len == 0 || sigma_out.is_empty() {
        return;
    }

    #[cfg(feature = "parallel")]
    {
        sigma_out
            .par_chunks_mut(group_len)
            .zip(sigma_in.par_chunks(group_len))
            .for_each(|(out, inp)| body(inp, out));
    }

    #[cfg(not(feature = "parallel"))]
    {
        sigma_out
            .chunks_mut(group_len)
            .zip(sigma_in.chunks(group_len))
            .for_each(|(out, inp)| body(inp, out));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_cover_buffer_once() {
        let inp: Vec<Real> = (0..10).map(|x| x as Real).collect();
        let mut out = vec![0.0; 10];
        for_each_group(&inp, &mut out, 4, |i, o| {
            for (a, b) in o.iter_mut().zip(i) {
                *a += b + 1.0;
            }
        });
        let expected: Vec<Real> = (0..10).map(|x| x as Real + 1.0).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_zero_group_len_is_noop() {
        let mut out: Vec<Real> = vec![];
        for_each_group(&[], &mut out, 0, |_, _| unreachable!());
    }
}
