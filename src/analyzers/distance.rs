/// Euclidean distance from `point` to each entry of `points`, in input order.
pub fn euclidean_distance(point: [f64; 2], points: &[[f64; 2]]) -> Vec<f64> {
    points
        .iter()
        .map(|p| {
            p.iter()
                .zip(point.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect()
}

/// Indices of `points` sorted nearest first.
///
/// The sort is stable, so equidistant points keep their input order.
pub fn rank_by_distance(point: [f64; 2], points: &[[f64; 2]]) -> Vec<usize> {
    let distances = euclidean_distance(point, points);
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_and_pythagorean() {
        assert_eq!(
            euclidean_distance([0.0, 0.0], &[[0.0, 0.0], [3.0, 4.0]]),
            vec![0.0, 5.0]
        );
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = [1.5, -2.0];
        let b = [-3.25, 7.0];
        assert_eq!(euclidean_distance(a, &[b]), euclidean_distance(b, &[a]));
    }

    #[test]
    fn test_empty_points() {
        assert!(euclidean_distance([1.0, 1.0], &[]).is_empty());
        assert!(rank_by_distance([1.0, 1.0], &[]).is_empty());
    }

    #[test]
    fn test_rank_nearest_first_with_stable_ties() {
        let points = [[5.0, 0.0], [1.0, 0.0], [-1.0, 0.0], [0.0, 2.0]];
        assert_eq!(rank_by_distance([0.0, 0.0], &points), vec![1, 2, 3, 0]);
    }
}
