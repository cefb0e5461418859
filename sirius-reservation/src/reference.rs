use chrono::{DateTime, Utc};
use rand::Rng;

const SEGMENT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SEGMENT_LEN: usize = 4;

/// Issues human-readable booking references such as `SIR-K7QD-482913`.
///
/// References look unique but nothing checks them against earlier ones.
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    prefix: String,
}

impl ReferenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng(), Utc::now())
    }

    /// Format: `{prefix}-{4 random A-Z0-9}-{last 6 digits of epoch millis}`
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> String {
        let segment: String = (0..SEGMENT_LEN)
            .map(|_| SEGMENT_ALPHABET[rng.gen_range(0..SEGMENT_ALPHABET.len())] as char)
            .collect();
        let clock = now.timestamp_millis().rem_euclid(1_000_000);

        format!("{}-{}-{:06}", self.prefix, segment, clock)
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new("SIR")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reference_format() {
        let generator = ReferenceGenerator::default();
        let reference = generator.generate();

        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SIR");
        assert_eq!(parts[1].len(), 4);
        assert!(parts[1].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_time_segment_keeps_leading_zeros() {
        let generator = ReferenceGenerator::new("FARM");
        let now = DateTime::from_timestamp_millis(1_750_000_012_345).unwrap();

        let reference = generator.generate_with(&mut StdRng::seed_from_u64(7), now);
        assert!(reference.starts_with("FARM-"));
        assert!(reference.ends_with("-012345"));
    }

    #[test]
    fn test_same_seed_same_reference() {
        let generator = ReferenceGenerator::default();
        let now = Utc::now();

        let a = generator.generate_with(&mut StdRng::seed_from_u64(42), now);
        let b = generator.generate_with(&mut StdRng::seed_from_u64(42), now);
        assert_eq!(a, b);
    }
}
