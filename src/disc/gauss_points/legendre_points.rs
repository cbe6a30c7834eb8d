use ndarray::{Array, Ix1, array};

pub fn get_legendre_points_interval(points_num: usize) -> (Array<f64, Ix1>, Array<f64, Ix1>) {
    let (gauss_points, gauss_weights) = match points_num {
        1 => {
            let points = array![0.0];
            let weights = array![2.0];
            (points, weights)
        }
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            let points = array![-p, p];
            let weights = array![1.0, 1.0];
            (points, weights)
        }
        3 => {
            let points = array![-0.7745966692414834, 0.0, 0.7745966692414834];
            let weights = array![0.5555555555555556, 0.8888888888888888, 0.5555555555555556];
            (points, weights)
        }
        4 => {
            let points = array![
                -0.8611363115940526,
                -0.3399810435848563,
                0.3399810435848563,
                0.8611363115940526
            ];
            let weights = array![
                0.3478548451374538,
                0.6521451548625461,
                0.6521451548625461,
                0.3478548451374538
            ];
            (points, weights)
        }
        5 => {
            let points = array![
                -0.9061798459386640,
                -0.5384693101056831,
                0.0,
                0.5384693101056831,
                0.9061798459386640
            ];
            let weights = array![
                0.2369268850561891,
                0.4786286704993665,
                0.5688888888888889,
                0.4786286704993665,
                0.2369268850561891
            ];
            (points, weights)
        }
        6 => {
            let points = array![
                -0.9324695142031521,
                -0.6612093864662645,
                -0.2386191860831969,
                0.2386191860831969,
                0.6612093864662645,
                0.9324695142031521
            ];
            let weights = array![
                0.1713244923791704,
                0.3607615730481386,
                0.4679139345726910,
                0.4679139345726910,
                0.3607615730481386,
                0.1713244923791704
            ];
            (points, weights)
        }
        _ => panic!("Number of Legendre points not supported: {}", points_num),
    };
    (gauss_points, gauss_weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_interval_length() {
        for n in 1..=6 {
            let (_, weights) = get_legendre_points_interval(n);
            let sum: f64 = weights.sum();
            assert!((sum - 2.0).abs() < 1e-13, "n = {}: sum = {}", n, sum);
        }
    }

    #[test]
    fn exactness_degree_2n_minus_1() {
        // n-point Gauss-Legendre integrates x^(2n - 2) exactly.
        for n in 1..=6 {
            let (points, weights) = get_legendre_points_interval(n);
            let degree = 2 * n - 2;
            let approx: f64 = points
                .iter()
                .zip(weights.iter())
                .map(|(&x, &w)| w * x.powi(degree as i32))
                .sum();
            let exact = 2.0 / (degree as f64 + 1.0);
            assert!(
                (approx - exact).abs() < 1e-12,
                "n = {}: approx = {}, exact = {}",
                n,
                approx,
                exact
            );
        }
    }
}
