//! Small numeric helpers shared by the analytics components.

/// Arithmetic mean; 0.0 over an empty iterator.
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            sum / count as f64
        }
    }
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub(crate) fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied());
    #[allow(clippy::cast_precision_loss)]
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Pearson correlation coefficient between two equal-length series.
///
/// `None` when either series has fewer than two values or zero variance.
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    if xs.len() < 2 {
        return None;
    }
    let mx = mean(xs.iter().copied());
    let my = mean(ys.iter().copied());

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mx) * (y - my);
        var_x += (x - mx) * (x - mx);
        var_y += (y - my) * (y - my);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}
