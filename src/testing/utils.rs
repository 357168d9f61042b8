use num_traits::Float;

/// Arithmetic mean, NaN for an empty slice.
pub fn mean<T: Float>(values: &[T]) -> T {
    if values.is_empty() {
        return T::nan();
    }
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    sum / T::from(values.len()).unwrap_or_else(T::nan)
}

/// Population standard deviation (divisor `n`), NaN for an empty slice.
pub fn population_std<T: Float>(values: &[T]) -> T {
    if values.is_empty() {
        return T::nan();
    }
    let mu = mean(values);
    let sum_sq = values
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - mu) * (v - mu));
    (sum_sq / T::from(values.len()).unwrap_or_else(T::nan)).sqrt()
}
