use rand::distributions::Distribution;
use rand::Rng;
use rand_distr::Gamma;

/// Symmetric Dirichlet distribution built from independent gamma samples,
/// falling back to a one-hot sample when the gamma samples underflow.
///
/// Every valid `alpha` is sampled through [Gamma], however small. The underflow check on the sum already catches the
/// degenerate low-alpha draws, so a fixed alpha cutoff would only replace real low-alpha noise with one-hot noise.
#[derive(Debug, Copy, Clone)]
pub struct StableDirichlet {
    alpha: f32,
    len: usize,
}

#[derive(Debug, Copy, Clone)]
pub struct DirichletError;

impl StableDirichlet {
    pub fn new(alpha: f32, len: usize) -> Result<Self, DirichletError> {
        if alpha > 0.0 && alpha.is_finite() && len > 0 {
            Ok(Self { alpha, len })
        } else {
            Err(DirichletError)
        }
    }
}

const SUM_MIN: f32 = 0.00000001;

impl Distribution<Vec<f32>> for StableDirichlet {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        if self.len == 1 {
            return vec![1.0];
        }

        let gamma = Gamma::new(self.alpha, 1.0).expect("Alpha was checked to be positive and finite");

        let mut values = Vec::with_capacity(self.len);
        let mut sum = 0.0;
        for _ in 0..self.len {
            let v: f32 = gamma.sample(rng);
            values.push(v);
            sum += v;
        }

        if sum > SUM_MIN {
            for v in &mut values {
                *v /= sum;
            }
            return values;
        }

        let index = rng.gen_range(0..self.len);
        let mut result = vec![0.0; self.len];
        result[index] = 1.0;
        result
    }
}

#[cfg(test)]
mod test {
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::util::stable_dirichlet::StableDirichlet;

    #[test]
    fn sums_to_one() {
        let mut rng = StdRng::seed_from_u64(0);
        for len in [1, 2, 10, 155] {
            let dist = StableDirichlet::new(0.3, len).unwrap();
            for _ in 0..10 {
                let sample = dist.sample(&mut rng);
                assert_eq!(sample.len(), len);
                assert!(sample.iter().all(|&x| (0.0..=1.0).contains(&x)));
                let sum: f32 = sample.iter().sum();
                assert!((sum - 1.0).abs() < 1e-4, "sum was {}", sum);
            }
        }
    }

    #[test]
    fn low_alpha() {
        let mut rng = StdRng::seed_from_u64(1);
        let dist = StableDirichlet::new(0.01, 30).unwrap();
        for _ in 0..20 {
            let sample = dist.sample(&mut rng);
            assert!(sample.iter().all(|x| x.is_finite() && (0.0..=1.0).contains(x)));
            let sum: f32 = sample.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4, "sum was {}", sum);
        }
    }

    #[test]
    fn invalid_parameters() {
        assert!(StableDirichlet::new(0.0, 5).is_err());
        assert!(StableDirichlet::new(0.3, 0).is_err());
        assert!(StableDirichlet::new(f32::NAN, 5).is_err());
    }
}
