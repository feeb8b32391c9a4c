//! Primality helpers used by the prime spiral.
//!
//! Everything here is plain trial division. The spiral asks about a few
//! hundred indices per generation, which keeps a sieve from paying off.

/// Returns `true` when `n` is prime.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut k = 5u64;
    while k <= n / k {
        if n % k == 0 || n % (k + 2) == 0 {
            return false;
        }
        k += 6;
    }
    true
}

/// Collects up to `count` primes in ascending order, starting from 2.
///
/// Scanning stops once a candidate exceeds `max`, so the result can be
/// shorter than `count`.
pub fn generate_prime_sequence(count: usize, max: u64) -> Vec<u64> {
    let mut primes = Vec::with_capacity(count.min(1024));
    let mut candidate = 2u64;
    while primes.len() < count && candidate <= max {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Returns every prime in the inclusive range `[min, max]`.
pub fn find_primes_in_range(min: u64, max: u64) -> Vec<u64> {
    if min > max {
        return Vec::new();
    }
    (min..=max).filter(|&n| is_prime(n)).collect()
}

const AFFIRMATIONS: [&str; 7] = [
    "I am grounded and whole",
    "I create with joy",
    "I act with purpose",
    "I give and receive love freely",
    "I speak my truth",
    "I trust my inner vision",
    "I am one with all that is",
];

/// Picks the affirmation shown next to a highlighted prime.
pub fn prime_affirmation(prime: u64) -> &'static str {
    AFFIRMATIONS[(prime % AFFIRMATIONS.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(n: u64) -> bool {
        n >= 2 && (2..n).all(|d| n % d != 0)
    }

    #[test]
    fn matches_brute_force_up_to_ten_thousand() {
        for n in 0..=10_000u64 {
            assert_eq!(is_prime(n), brute_force(n), "mismatch at {n}");
        }
    }

    #[test]
    fn small_values() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(9));
        assert!(!is_prime(25));
        assert!(is_prime(7919));
    }

    #[test]
    fn first_five_primes() {
        assert_eq!(generate_prime_sequence(5, 1_000), vec![2, 3, 5, 7, 11]);
    }

    #[test]
    fn sequence_stops_at_max() {
        assert_eq!(generate_prime_sequence(100, 20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert!(generate_prime_sequence(3, 1).is_empty());
        assert!(generate_prime_sequence(0, 1_000).is_empty());
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(find_primes_in_range(10, 29), vec![11, 13, 17, 19, 23, 29]);
        assert_eq!(find_primes_in_range(2, 2), vec![2]);
        assert!(find_primes_in_range(30, 10).is_empty());
    }

    #[test]
    fn affirmation_is_stable() {
        assert_eq!(prime_affirmation(7), prime_affirmation(7));
        assert_eq!(prime_affirmation(7), AFFIRMATIONS[0]);
        assert_eq!(prime_affirmation(11), AFFIRMATIONS[4]);
    }
}
